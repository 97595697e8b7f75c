//! Lowers rendered blocks into WordprocessingML nodes.
//!
//! Style candidates carried by the blocks are resolved against the
//! template's style table here; the first name the template defines wins,
//! and an unresolved list leaves the style element out so Word applies its
//! default.

use inkdoc_ooxml::styles::{StyleKind, StyleTable};
use inkdoc_ooxml::xml::XmlNode;
use inkdoc_render::{DocBlock, DocRun, Subdocument, TableRow};

use crate::error::TemplateError;
use crate::media::{EmbeddedImage, MediaAllocator};

const INLINE_CODE_STYLES: [&str; 2] = ["行内代码", "Inline Code"];
const HEADER_CELL_STYLES: [&str; 2] = ["表格-表头", "表格表头"];
const BODY_CELL_STYLES: [&str; 2] = ["表格-正文", "表格正文"];

const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PICTURE_DATA_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Lower every block of the subdocument, allocating media for images.
///
/// # Errors
///
/// Returns an error if an image cannot be embedded.
pub fn lower_blocks(
    content: &Subdocument,
    styles: &StyleTable,
    media: &mut MediaAllocator<'_>,
) -> Result<Vec<XmlNode>, TemplateError> {
    let code_style = styles.resolve(&INLINE_CODE_STYLES, StyleKind::Character);
    let mut nodes = Vec::with_capacity(content.blocks.len());
    for block in &content.blocks {
        match block {
            DocBlock::Paragraph {
                runs,
                style,
                align_center,
                keep_lines,
                clear_indent,
                warn_on_style_fallback,
            } => {
                let style_id = resolve_style(styles, style, StyleKind::Paragraph);
                if style_id.is_none() && *warn_on_style_fallback {
                    tracing::warn!(
                        candidates = ?style,
                        "Paragraph style not found in template, using default"
                    );
                }
                let flags = ParagraphFlags {
                    align_center: *align_center,
                    keep_lines: *keep_lines,
                    clear_indent: *clear_indent,
                };
                nodes.push(paragraph_node(runs, style_id, flags, code_style));
            }
            DocBlock::Image { path, style } => {
                let embedded = media.allocate(path)?;
                let style_id = resolve_style(styles, style, StyleKind::Paragraph);
                nodes.push(image_paragraph(&embedded, style_id));
            }
            DocBlock::Table { style, rows } => {
                let style_id = resolve_style(styles, style, StyleKind::Table);
                nodes.push(table_node(rows, style_id, styles));
            }
        }
    }
    Ok(nodes)
}

/// Formatting switches of a lowered paragraph.
#[derive(Debug, Clone, Copy, Default)]
struct ParagraphFlags {
    align_center: bool,
    keep_lines: bool,
    clear_indent: bool,
}

fn resolve_style(styles: &StyleTable, candidates: &[String], kind: StyleKind) -> Option<String> {
    let names: Vec<&str> = candidates.iter().map(String::as_str).collect();
    styles.resolve(&names, kind).map(str::to_owned)
}

fn paragraph_node(
    runs: &[DocRun],
    style_id: Option<String>,
    flags: ParagraphFlags,
    code_style: Option<&str>,
) -> XmlNode {
    let mut properties = XmlNode::new("w:pPr");
    if let Some(id) = style_id {
        properties
            .children
            .push(XmlNode::new("w:pStyle").with_attr("w:val", id));
    }
    if flags.keep_lines {
        properties.children.push(XmlNode::new("w:keepLines"));
    }
    if flags.clear_indent {
        properties.children.push(
            XmlNode::new("w:ind")
                .with_attr("w:left", "0")
                .with_attr("w:firstLine", "0"),
        );
    }
    if flags.align_center {
        properties
            .children
            .push(XmlNode::new("w:jc").with_attr("w:val", "center"));
    }

    let mut paragraph = XmlNode::new("w:p");
    if !properties.children.is_empty() {
        paragraph.children.push(properties);
    }
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        paragraph.children.push(run_node(run, code_style));
    }
    paragraph
}

fn run_node(run: &DocRun, code_style: Option<&str>) -> XmlNode {
    let mut node = XmlNode::new("w:r");
    if run.code
        && let Some(id) = code_style
    {
        node.children.push(
            XmlNode::new("w:rPr").with_child(XmlNode::new("w:rStyle").with_attr("w:val", id)),
        );
    }
    append_run_content(&mut node, &run.text);
    node
}

/// Append run content, mapping newlines to breaks and tabs to tab marks.
fn append_run_content(run: &mut XmlNode, text: &str) {
    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\n' => {
                flush_text(run, &mut pending);
                run.children.push(XmlNode::new("w:br"));
            }
            '\t' => {
                flush_text(run, &mut pending);
                run.children.push(XmlNode::new("w:tab"));
            }
            _ => pending.push(ch),
        }
    }
    flush_text(run, &mut pending);
}

fn flush_text(run: &mut XmlNode, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut t = XmlNode::new("w:t").with_text(pending.as_str());
    if pending.starts_with(char::is_whitespace) || pending.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    run.children.push(t);
    pending.clear();
}

/// Build the keep-with-next paragraph that carries an embedded picture.
fn image_paragraph(image: &EmbeddedImage, style_id: Option<String>) -> XmlNode {
    let mut properties = XmlNode::new("w:pPr");
    if let Some(id) = style_id {
        properties
            .children
            .push(XmlNode::new("w:pStyle").with_attr("w:val", id));
    }
    properties.children.push(XmlNode::new("w:keepNext"));

    XmlNode::new("w:p")
        .with_child(properties)
        .with_child(XmlNode::new("w:r").with_child(drawing_node(image)))
}

/// Inline picture drawing with the namespaces declared locally, so the
/// markup stays valid in parts that do not declare them on the root.
fn drawing_node(image: &EmbeddedImage) -> XmlNode {
    let cx = image.width_emu.to_string();
    let cy = image.height_emu.to_string();
    let id = image.drawing_id.to_string();

    let blip_fill = XmlNode::new("pic:blipFill")
        .with_child(
            XmlNode::new("a:blip")
                .with_attr("xmlns:r", NS_R)
                .with_attr("r:embed", &image.rel_id),
        )
        .with_child(XmlNode::new("a:stretch").with_child(XmlNode::new("a:fillRect")));

    let shape_properties = XmlNode::new("pic:spPr")
        .with_child(
            XmlNode::new("a:xfrm")
                .with_child(XmlNode::new("a:off").with_attr("x", "0").with_attr("y", "0"))
                .with_child(
                    XmlNode::new("a:ext")
                        .with_attr("cx", &cx)
                        .with_attr("cy", &cy),
                ),
        )
        .with_child(
            XmlNode::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(XmlNode::new("a:avLst")),
        );

    let picture = XmlNode::new("pic:pic")
        .with_attr("xmlns:pic", NS_PIC)
        .with_child(
            XmlNode::new("pic:nvPicPr")
                .with_child(
                    XmlNode::new("pic:cNvPr")
                        .with_attr("id", &id)
                        .with_attr("name", &image.file_name),
                )
                .with_child(XmlNode::new("pic:cNvPicPr")),
        )
        .with_child(blip_fill)
        .with_child(shape_properties);

    let inline = XmlNode::new("wp:inline")
        .with_attr("xmlns:wp", NS_WP)
        .with_attr("distT", "0")
        .with_attr("distB", "0")
        .with_attr("distL", "0")
        .with_attr("distR", "0")
        .with_child(
            XmlNode::new("wp:extent")
                .with_attr("cx", &cx)
                .with_attr("cy", &cy),
        )
        .with_child(
            XmlNode::new("wp:effectExtent")
                .with_attr("l", "0")
                .with_attr("t", "0")
                .with_attr("r", "0")
                .with_attr("b", "0"),
        )
        .with_child(
            XmlNode::new("wp:docPr")
                .with_attr("id", &id)
                .with_attr("name", &image.file_name),
        )
        .with_child(
            XmlNode::new("wp:cNvGraphicFramePr").with_child(
                XmlNode::new("a:graphicFrameLocks")
                    .with_attr("xmlns:a", NS_A)
                    .with_attr("noChangeAspect", "1"),
            ),
        )
        .with_child(
            XmlNode::new("a:graphic").with_attr("xmlns:a", NS_A).with_child(
                XmlNode::new("a:graphicData")
                    .with_attr("uri", PICTURE_DATA_URI)
                    .with_child(picture),
            ),
        );

    XmlNode::new("w:drawing").with_child(inline)
}

fn table_node(rows: &[TableRow], style_id: Option<String>, styles: &StyleTable) -> XmlNode {
    let mut table_properties = XmlNode::new("w:tblPr");
    if let Some(id) = style_id {
        table_properties
            .children
            .push(XmlNode::new("w:tblStyle").with_attr("w:val", id));
    }
    table_properties.children.push(
        XmlNode::new("w:tblW")
            .with_attr("w:w", "0")
            .with_attr("w:type", "auto"),
    );

    let columns = rows.first().map_or(0, |row| row.cells.len());
    let mut grid = XmlNode::new("w:tblGrid");
    for _ in 0..columns {
        grid.children.push(XmlNode::new("w:gridCol"));
    }

    let header_style = styles.resolve(&HEADER_CELL_STYLES, StyleKind::Paragraph);
    let body_style = styles.resolve(&BODY_CELL_STYLES, StyleKind::Paragraph);

    let mut table = XmlNode::new("w:tbl")
        .with_child(table_properties)
        .with_child(grid);
    for row in rows {
        let cell_style = if row.header { header_style } else { body_style };
        let mut table_row = XmlNode::new("w:tr");
        for cell in &row.cells {
            table_row.children.push(cell_node(cell, cell_style));
        }
        table.children.push(table_row);
    }
    table
}

fn cell_node(text: &str, style_id: Option<&str>) -> XmlNode {
    let mut paragraph = XmlNode::new("w:p");
    if let Some(id) = style_id {
        paragraph.children.push(
            XmlNode::new("w:pPr").with_child(XmlNode::new("w:pStyle").with_attr("w:val", id)),
        );
    }
    if !text.is_empty() {
        let mut run = XmlNode::new("w:r");
        append_run_content(&mut run, text);
        paragraph.children.push(run);
    }

    XmlNode::new("w:tc")
        .with_child(
            XmlNode::new("w:tcPr").with_child(
                XmlNode::new("w:tcW")
                    .with_attr("w:w", "0")
                    .with_attr("w:type", "auto"),
            ),
        )
        .with_child(paragraph)
}
