//! Walks the collected block tree and emits the styled document body.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::block::{BlockNode, ListNode, RowKind, stripped_text};
use crate::heading::strip_heading_number;
use crate::inline::inline_runs;
use crate::language::format_language;
use crate::subdoc::{Subdocument, TableRow};

/// Matches a caption paragraph such as `表3 参数说明`.
static TABLE_CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^表\s*\d+\s+.+").expect("invalid table caption regex"));

/// Link targets with these suffixes render as figures.
const IMAGE_LINK_SUFFIXES: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"];

/// Renders block nodes into a [`Subdocument`].
///
/// Carries the figure counter and the pending table caption across blocks;
/// both are document-wide, so one renderer handles one source document.
pub struct SubdocRenderer {
    base_dir: PathBuf,
    doc: Subdocument,
    fig_index: u32,
    pending_table_caption: Option<String>,
}

impl SubdocRenderer {
    /// Create a renderer resolving relative image paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            doc: Subdocument::default(),
            fig_index: 0,
            pending_table_caption: None,
        }
    }

    /// Render all blocks and return the finished document body.
    #[must_use]
    pub fn render(mut self, blocks: &[BlockNode]) -> Subdocument {
        for block in blocks {
            self.render_block(block);
        }
        self.doc
    }

    fn render_block(&mut self, block: &BlockNode) {
        match block {
            BlockNode::Heading { level, text } => self.render_heading(*level, text),
            BlockNode::Paragraph {
                inlines,
                images,
                links,
            } => {
                let text = stripped_text(inlines);
                if !text.is_empty() {
                    if TABLE_CAPTION_RE.is_match(&text) {
                        self.pending_table_caption = Some(text);
                    } else {
                        self.doc.add_runs_paragraph(inline_runs(inlines), "Normal");
                    }
                }
                for image in images {
                    self.handle_image(&image.src, &image.alt);
                }
                for link in links {
                    if is_image_link(&link.href) {
                        self.handle_image(&link.href, &link.text);
                    }
                }
            }
            BlockNode::Blockquote { lines } => self.render_quote(lines),
            BlockNode::CodeBlock { language, text } => {
                self.render_code(language.as_deref(), text);
            }
            BlockNode::List(list) => self.render_list(list),
            BlockNode::Table { rows } => self.render_table(rows),
        }
    }

    fn render_heading(&mut self, level: u8, text: &str) {
        let style = match level {
            1 => "heading 1",
            2 => "heading 2",
            3 => "heading 3",
            4 => "heading 4",
            _ => {
                tracing::debug!(level, "Skipping deep heading");
                return;
            }
        };
        self.doc.add_heading(&strip_heading_number(text), style);
    }

    /// Route each quote line to an admonition style by its prefix.
    fn render_quote(&mut self, chunks: &[String]) {
        let text = chunks
            .iter()
            .map(|chunk| chunk.trim())
            .filter(|chunk| !chunk.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        for line in text.split('\n') {
            let stripped = line.trim();
            let style = if stripped.starts_with("提示:") || stripped.starts_with("提示：") {
                "提示块"
            } else if stripped.starts_with("注意:") || stripped.starts_with("注意：") {
                "注意块"
            } else if stripped.starts_with("警告:") || stripped.starts_with("警告：") {
                "警告块"
            } else {
                "引用块"
            };
            self.doc.add_paragraph(line, style);
        }
    }

    fn render_code(&mut self, language: Option<&str>, text: &str) {
        if let Some(lang) = language {
            let label = format!("语言：{}", format_language(lang));
            self.doc.add_code_language_label(&label);
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for line in normalized.trim_end_matches('\n').split('\n') {
            self.doc.add_code_line(line);
        }
    }

    fn render_list(&mut self, list: &ListNode) {
        let style = if list.ordered {
            "列表-有序"
        } else {
            "列表-无序"
        };
        for item in &list.items {
            if !stripped_text(&item.inlines).is_empty() || item.has_code {
                self.doc
                    .add_runs_paragraph(inline_runs(&item.inlines), style);
            }
            for nested in &item.nested {
                self.render_list(nested);
            }
        }
    }

    /// Emit the pending caption, then the table unless it has no cells.
    fn render_table(&mut self, rows: &[(RowKind, Vec<String>)]) {
        if let Some(caption) = self.pending_table_caption.take() {
            self.doc.add_table_caption(&caption);
        }
        if rows.is_empty() {
            return;
        }
        let max_cols = rows
            .iter()
            .map(|(_, cells)| cells.len())
            .max()
            .unwrap_or(0);
        if max_cols == 0 {
            return;
        }
        let padded = rows
            .iter()
            .map(|(kind, cells)| {
                let mut cells = cells.clone();
                cells.resize(max_cols, String::new());
                TableRow {
                    header: matches!(kind, RowKind::Header),
                    cells,
                }
            })
            .collect();
        self.doc.add_table(padded);
    }

    /// Emit a figure: the image (or a missing-file placeholder) plus a
    /// numbered caption. The counter advances either way so later figure
    /// numbers stay stable while an image is still being produced.
    fn handle_image(&mut self, src: &str, alt: &str) {
        if src.is_empty() {
            return;
        }
        let mut name = alt.trim().to_owned();
        if name.is_empty() {
            name = Path::new(src)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        self.fig_index += 1;
        let caption = if name.is_empty() {
            format!("图{}", self.fig_index)
        } else {
            format!("图{} {name}", self.fig_index)
        };
        let path = self.resolve_image_path(src);
        if path.exists() {
            self.doc.add_image(path);
        } else {
            tracing::warn!(src = %src, "Image not found, inserting placeholder");
            self.doc
                .add_paragraph(&format!("[图片缺失: {src}]"), "Normal");
        }
        self.doc.add_caption(&caption);
    }

    fn resolve_image_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn is_image_link(href: &str) -> bool {
    let lower = href.to_lowercase();
    IMAGE_LINK_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}
