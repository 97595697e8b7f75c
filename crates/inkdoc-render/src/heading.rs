//! Heading number stripping.
//!
//! Source documents arrive with author-typed heading numbers in several
//! conventions; the template numbers headings itself, so the leading
//! markers are removed before emission.

use std::sync::LazyLock;

use regex::Regex;

/// Leading heading-number patterns, tried in order.
///
/// Each pattern that matches is stripped and the result re-trimmed before
/// the next pattern is tried, so compound markers like a chapter prefix
/// followed by a dotted number are both removed.
static HEADING_NUM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 第3章 / 第十二节 / 第2部分, with optional trailing separator
        r"^\s*第\s*([0-9]+|[一二三四五六七八九十百千]+)\s*(章|节|部分|篇)\s*[:：、\.\s]*",
        // 一、 / 二. / 三)
        r"^\s*[一二三四五六七八九十百千]+\s*[、\.\)]\s*",
        // 2.1 / 3.2.4 / 1.2), multi-level dotted
        r"^\s*\d+(?:\.\d+)+\s*[\.\)]?\s*",
        // 3、 / 4. / 5), single level
        r"^\s*\d+\s*[、\.\)]\s*",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("invalid heading number pattern"))
    .collect()
});

/// Strip leading heading numbers from heading text.
#[must_use]
pub fn strip_heading_number(text: &str) -> String {
    let mut current = text.trim().to_owned();
    if current.is_empty() {
        return current;
    }
    for pattern in HEADING_NUM_PATTERNS.iter() {
        let stripped = pattern.replace(&current, "").trim().to_owned();
        if stripped != current {
            current = stripped;
        }
    }
    current
}
