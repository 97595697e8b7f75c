//! Inline run assembly.
//!
//! Code spans sit visually tight against CJK text, so the single ASCII
//! space around a span is replaced with a thin space, and spaces inside the
//! span become non-breaking so Word cannot wrap mid-command.

use crate::block::Inline;
use crate::subdoc::DocRun;

/// Thin space substituted for the ASCII space next to a code span.
const THIN_SPACE: char = '\u{2009}';
/// Non-breaking space substituted inside code span text.
const NO_BREAK_SPACE: &str = "\u{00a0}";

/// Assemble paragraph runs from inline children.
///
/// Code spans carry the inline code style; a trailing space on text right
/// before a span and a leading space on text right after one become thin
/// spaces. An empty code span emits no run but still counts for spacing.
#[must_use]
pub fn inline_runs(inlines: &[Inline]) -> Vec<DocRun> {
    let mut runs = Vec::new();
    let mut pending_thinspace = false;

    for (idx, child) in inlines.iter().enumerate() {
        match child {
            Inline::Text(text) => {
                let mut text = apply_pending(text, &mut pending_thinspace);
                if !text.is_empty() {
                    if matches!(inlines.get(idx + 1), Some(Inline::Code(_)))
                        && text.ends_with(' ')
                    {
                        text.pop();
                        text.push(THIN_SPACE);
                    }
                    runs.push(DocRun::plain(text));
                }
            }
            Inline::Code(code) => {
                if !code.is_empty() {
                    runs.push(DocRun::code(code.replace(' ', NO_BREAK_SPACE)));
                }
                if matches!(inlines.get(idx + 1), Some(Inline::Text(_))) {
                    pending_thinspace = true;
                }
            }
            Inline::Span(text) => {
                let text = apply_pending(text, &mut pending_thinspace);
                if !text.is_empty() {
                    runs.push(DocRun::plain(text));
                }
            }
        }
    }
    runs
}

/// Consume the pending thin-space flag, replacing a leading space.
fn apply_pending(text: &str, pending: &mut bool) -> String {
    let out = if *pending && text.starts_with(' ') {
        let mut replaced = String::with_capacity(text.len() + 2);
        replaced.push(THIN_SPACE);
        replaced.push_str(&text[1..]);
        replaced
    } else {
        text.to_owned()
    };
    *pending = false;
    out
}
