//! Markdown rendering for inkdoc.
//!
//! Parses a Markdown manual with pulldown-cmark, collects the event stream
//! into a block tree, and renders that tree into a [`Subdocument`]: the
//! ordered sequence of styled paragraphs, images, and tables that the
//! template engine merges into the content placeholder of a .docx template.
//!
//! Rendering semantics are tuned for Chinese software manuals: heading
//! numbers are stripped (the template numbers headings itself), figures get
//! auto-numbered `图N` captions, `表N` paragraphs become table captions,
//! and admonition blockquotes route to dedicated styles.

mod block;
mod collect;
mod heading;
mod inline;
mod language;
mod render;
mod styles;
mod subdoc;

use std::path::Path;

pub use block::{BlockNode, ImageRef, Inline, LinkRef, ListItem, ListNode, RowKind};
pub use collect::collect_blocks;
pub use heading::strip_heading_number;
pub use language::format_language;
pub use render::SubdocRenderer;
pub use styles::expand_candidates;
pub use subdoc::{DocBlock, DocRun, Subdocument, TableRow};

/// Rendering error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Markdown source file does not exist.
    #[error("markdown file not found: {}", .0.display())]
    SourceNotFound(std::path::PathBuf),

    /// I/O error while reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a Markdown file into a subdocument.
///
/// Image references are resolved relative to the file's directory; a
/// missing image renders as a visible placeholder paragraph, but a missing
/// source file is an error.
///
/// # Errors
///
/// Returns an error if the source file does not exist or cannot be read.
pub fn render_markdown(md_path: &Path) -> Result<Subdocument, RenderError> {
    if !md_path.exists() {
        return Err(RenderError::SourceNotFound(md_path.to_path_buf()));
    }
    let text = std::fs::read_to_string(md_path)?;

    let base_dir = if md_path.is_absolute() {
        md_path.parent().map(Path::to_path_buf)
    } else {
        let absolute = std::env::current_dir()?.join(md_path);
        absolute.parent().map(Path::to_path_buf)
    };
    let base_dir = base_dir.unwrap_or_else(|| std::path::PathBuf::from("."));

    let blocks = collect_blocks(&text);
    Ok(SubdocRenderer::new(base_dir).render(&blocks))
}
