//! Block tree collected from the Markdown event stream.
//!
//! The tree is produced once per source document and consumed once by the
//! renderer; nodes carry flattened inline text in the places where the
//! output flattens anyway (headings, blockquote lines, table cells).

/// Inline content of a paragraph or list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Bare text between markup.
    Text(String),
    /// Inline code span.
    Code(String),
    /// Flattened text of a styled span (emphasis, link label, and so on).
    Span(String),
}

impl Inline {
    /// The inline's text content.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) | Self::Code(t) | Self::Span(t) => t,
        }
    }
}

/// Concatenation of per-segment-trimmed inline text.
///
/// This is the "visible text" used for emptiness gates, caption detection,
/// and heading content.
#[must_use]
pub fn stripped_text(inlines: &[Inline]) -> String {
    inlines.iter().map(|i| i.text().trim()).collect()
}

/// Image reference with its alt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Source path or URL as written.
    pub src: String,
    /// Alt text, unprocessed.
    pub alt: String,
}

/// Link reference with its flattened label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Target as written.
    pub href: String,
    /// Label with per-segment trimming applied.
    pub text: String,
}

/// One list, ordered or unordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    /// Whether the list is numbered.
    pub ordered: bool,
    /// Items in document order.
    pub items: Vec<ListItem>,
}

/// One list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// The item's own inline content, nested lists excluded.
    pub inlines: Vec<Inline>,
    /// Whether a code span appeared anywhere in the item's own content.
    ///
    /// Loose items flatten their paragraphs into plain spans, so the flag
    /// survives flattening and keeps the item renderable.
    pub has_code: bool,
    /// Directly nested sublists in document order.
    pub nested: Vec<ListNode>,
}

/// Table row kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Header row.
    Header,
    /// Body row.
    Body,
}

/// One block-level node of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockNode {
    /// Heading with its level (1-6) and flattened text.
    Heading {
        /// Heading level.
        level: u8,
        /// Flattened heading text.
        text: String,
    },
    /// Paragraph with inline content plus the images and links found in it.
    Paragraph {
        /// Inline children in order.
        inlines: Vec<Inline>,
        /// Images referenced anywhere inside the paragraph.
        images: Vec<ImageRef>,
        /// Links found anywhere inside the paragraph.
        links: Vec<LinkRef>,
    },
    /// Blockquote flattened to text chunks.
    Blockquote {
        /// Raw text chunks, one per inline segment; the renderer trims
        /// them and splits on newlines to get quote lines.
        lines: Vec<String>,
    },
    /// Fenced or indented code block.
    CodeBlock {
        /// Language tag from the fence info string.
        language: Option<String>,
        /// Raw code content.
        text: String,
    },
    /// Ordered or unordered list.
    List(ListNode),
    /// Table with rows classified as header or body.
    Table {
        /// Rows in document order with flattened cell text.
        rows: Vec<(RowKind, Vec<String>)>,
    },
}
