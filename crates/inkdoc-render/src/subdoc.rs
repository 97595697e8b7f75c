//! Output document model.
//!
//! A [`Subdocument`] is the append-only sequence of blocks the renderer
//! emits. Style references are carried as ordered candidate name lists and
//! resolved against the template's style table at merge time, so the model
//! itself stays independent of any particular template.

use std::path::PathBuf;

use crate::styles::expand_candidates;

/// One run of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRun {
    /// Run text.
    pub text: String,
    /// Whether the run carries the inline code character style.
    pub code: bool,
}

impl DocRun {
    /// Plain text run.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: false,
        }
    }

    /// Inline code run.
    #[must_use]
    pub fn code(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: true,
        }
    }
}

/// One table row with flattened cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Whether the row takes the header cell style.
    pub header: bool,
    /// Cell text, already padded to the table's column count.
    pub cells: Vec<String>,
}

/// One emitted block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocBlock {
    /// Styled paragraph.
    Paragraph {
        /// Runs in order.
        runs: Vec<DocRun>,
        /// Paragraph style candidates, first defined name wins.
        style: Vec<String>,
        /// Center alignment (table captions).
        align_center: bool,
        /// Keep the paragraph on one page (figure captions).
        keep_lines: bool,
        /// Clear inherited indentation (headings).
        clear_indent: bool,
        /// Log a warning when no style candidate resolves.
        warn_on_style_fallback: bool,
    },
    /// Centered image paragraph; rendered at fixed width with keep-with-next.
    Image {
        /// Resolved filesystem path of the image.
        path: PathBuf,
        /// Paragraph style candidates.
        style: Vec<String>,
    },
    /// Table with header/body cell styling.
    Table {
        /// Table style candidates.
        style: Vec<String>,
        /// Rows, already padded to a uniform column count.
        rows: Vec<TableRow>,
    },
}

/// Append-only output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subdocument {
    /// Emitted blocks in order.
    pub blocks: Vec<DocBlock>,
}

impl Subdocument {
    /// Append a plain paragraph unless the text is empty.
    ///
    /// `logical_style` expands through the bilingual alias table with
    /// `Normal` as the terminal fallback.
    pub fn add_paragraph(&mut self, text: &str, logical_style: &str) {
        if text.is_empty() {
            return;
        }
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(text)],
            style: expand_candidates(&[logical_style, "Normal"]),
            align_center: false,
            keep_lines: false,
            clear_indent: false,
            warn_on_style_fallback: false,
        });
    }

    /// Append a paragraph built from pre-assembled runs.
    pub fn add_runs_paragraph(&mut self, runs: Vec<DocRun>, logical_style: &str) {
        self.blocks.push(DocBlock::Paragraph {
            runs,
            style: expand_candidates(&[logical_style, "Normal"]),
            align_center: false,
            keep_lines: false,
            clear_indent: false,
            warn_on_style_fallback: false,
        });
    }

    /// Append a heading unless the text is empty.
    pub fn add_heading(&mut self, text: &str, level_style: &str) {
        if text.is_empty() {
            return;
        }
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(text)],
            style: expand_candidates(&[level_style, "heading 1"]),
            align_center: false,
            keep_lines: false,
            clear_indent: true,
            warn_on_style_fallback: false,
        });
    }

    /// Append a figure caption unless the text is empty.
    pub fn add_caption(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(text)],
            style: expand_candidates(&["图注", "Caption", "Normal"]),
            align_center: false,
            keep_lines: true,
            clear_indent: false,
            warn_on_style_fallback: false,
        });
    }

    /// Append a centered table caption.
    pub fn add_table_caption(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(text)],
            style: expand_candidates(&["表注", "Caption", "Normal"]),
            align_center: true,
            keep_lines: false,
            clear_indent: false,
            warn_on_style_fallback: true,
        });
    }

    /// Append a code block's language label.
    pub fn add_code_language_label(&mut self, label: &str) {
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(label)],
            style: expand_candidates(&["代码语言标记", "代码块"]),
            align_center: false,
            keep_lines: false,
            clear_indent: false,
            warn_on_style_fallback: false,
        });
    }

    /// Append one code line, empty lines included.
    pub fn add_code_line(&mut self, line: &str) {
        self.blocks.push(DocBlock::Paragraph {
            runs: vec![DocRun::plain(line)],
            style: expand_candidates(&["代码块", "Normal"]),
            align_center: false,
            keep_lines: false,
            clear_indent: false,
            warn_on_style_fallback: false,
        });
    }

    /// Append a centered image.
    ///
    /// The candidate list is literal: the dedicated image style, then the
    /// default style, with no alias expansion.
    pub fn add_image(&mut self, path: PathBuf) {
        self.blocks.push(DocBlock::Image {
            path,
            style: vec!["图片".to_owned(), "Normal".to_owned()],
        });
    }

    /// Append a table with pre-padded rows.
    pub fn add_table(&mut self, rows: Vec<TableRow>) {
        self.blocks.push(DocBlock::Table {
            style: expand_candidates(&["Inkdoc Table", "Normal Table", "Table Grid"]),
            rows,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn style_of(block: &DocBlock) -> &[String] {
        match block {
            DocBlock::Paragraph { style, .. }
            | DocBlock::Image { style, .. }
            | DocBlock::Table { style, .. } => style,
        }
    }

    #[test]
    fn test_empty_text_blocks_are_skipped() {
        let mut subdoc = Subdocument::default();
        subdoc.add_paragraph("", "Normal");
        subdoc.add_heading("", "heading 1");
        subdoc.add_caption("");
        assert!(subdoc.blocks.is_empty());
    }

    #[test]
    fn test_code_line_keeps_empty_lines() {
        let mut subdoc = Subdocument::default();
        subdoc.add_code_line("");
        assert_eq!(subdoc.blocks.len(), 1);
    }

    #[test]
    fn test_paragraph_style_expansion() {
        let mut subdoc = Subdocument::default();
        subdoc.add_paragraph("内容", "引用块");
        assert_eq!(
            style_of(&subdoc.blocks[0]),
            &["引用块", "Quote", "Intense Quote", "Normal", "正文"]
        );
    }

    #[test]
    fn test_image_style_is_literal() {
        let mut subdoc = Subdocument::default();
        subdoc.add_image(PathBuf::from("/tmp/a.png"));
        assert_eq!(style_of(&subdoc.blocks[0]), &["图片", "Normal"]);
    }

    #[test]
    fn test_caption_flags() {
        let mut subdoc = Subdocument::default();
        subdoc.add_caption("图1 架构");
        subdoc.add_table_caption("表1 参数");

        let DocBlock::Paragraph {
            keep_lines,
            align_center,
            ..
        } = &subdoc.blocks[0]
        else {
            panic!("expected paragraph");
        };
        assert!(keep_lines);
        assert!(!align_center);

        let DocBlock::Paragraph {
            align_center,
            warn_on_style_fallback,
            ..
        } = &subdoc.blocks[1]
        else {
            panic!("expected paragraph");
        };
        assert!(align_center);
        assert!(warn_on_style_fallback);
    }

    #[test]
    fn test_table_style_expansion() {
        let mut subdoc = Subdocument::default();
        subdoc.add_table(vec![TableRow {
            header: true,
            cells: vec!["A".to_owned()],
        }]);
        assert_eq!(
            style_of(&subdoc.blocks[0]),
            &[
                "Inkdoc Table",
                "Normal Table",
                "普通表格",
                "Table Grid",
                "表格网格"
            ]
        );
    }
}
