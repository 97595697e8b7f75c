//! One-shot repairs for templates whose placeholders got split.
//!
//! Word splits a typed placeholder into several runs as soon as spell
//! checking, formatting, or revision marks touch it, and the template
//! engine only substitutes placeholders contained in a single text node.
//! These repairs merge such runs back together so the template renders.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use inkdoc_ooxml::DocxPackage;
use inkdoc_ooxml::package::DOCUMENT_PART;
use inkdoc_ooxml::runs::{is_simple_run, paragraph_text, set_run_text, visit_paragraphs_mut};
use inkdoc_ooxml::xml::XmlNode;

use crate::error::TemplateError;
use crate::template::{CONTENT_PLACEHOLDER, SOFTWARE_NAME_PLACEHOLDER};

/// Longest run window considered when reassembling the cover title.
const MERGE_WINDOW: usize = 12;

/// Jinja-style placeholder forms, matched across line breaks.
static HEADER_PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.+?%\}|\{#.+?#\}").expect("invalid placeholder regex")
});

/// Merge runs splitting the cover `{{software_name}}` token.
///
/// Reads `input`, repairs `word/document.xml`, and writes the package to
/// `output`. Returns the number of merges.
///
/// # Errors
///
/// Returns an error if either package cannot be read or written.
pub fn fix_cover_title(input: &Path, output: &Path) -> Result<usize, TemplateError> {
    let mut package = DocxPackage::open(input)?;
    let merged = merge_cover_title(&mut package)?;
    package.save(output)?;
    Ok(merged)
}

/// In-memory form of [`fix_cover_title`].
///
/// # Errors
///
/// Returns an error if the document part is missing or unparsable.
pub fn merge_cover_title(package: &mut DocxPackage) -> Result<usize, TemplateError> {
    let mut document = package.xml_part(DOCUMENT_PART)?;
    let mut merged = 0;
    visit_paragraphs_mut(&mut document, &mut |paragraph| {
        merged += merge_exact_token(paragraph, SOFTWARE_NAME_PLACEHOLDER);
    });
    package.set_xml_part(DOCUMENT_PART, &document);
    Ok(merged)
}

/// Merge split placeholders in every header and footer part.
///
/// Handles all three placeholder forms and flattens tabs and breaks into
/// the merged text. Returns the number of merges.
///
/// # Errors
///
/// Returns an error if the package or one of its parts cannot be read or
/// written.
pub fn fix_headers(input: &Path, output: &Path) -> Result<usize, TemplateError> {
    let mut package = DocxPackage::open(input)?;
    let merged = merge_header_placeholders(&mut package)?;
    package.save(output)?;
    Ok(merged)
}

/// In-memory form of [`fix_headers`].
///
/// # Errors
///
/// Returns an error if a header or footer part cannot be parsed.
pub fn merge_header_placeholders(package: &mut DocxPackage) -> Result<usize, TemplateError> {
    let part_names: Vec<String> = package
        .part_names()
        .filter(|name| name.starts_with("word/header") || name.starts_with("word/footer"))
        .map(str::to_owned)
        .collect();
    let mut merged = 0;
    for part_name in part_names {
        let mut root = package.xml_part(&part_name)?;
        visit_paragraphs_mut(&mut root, &mut |paragraph| {
            merged += merge_paragraph_placeholders(paragraph);
        });
        package.set_xml_part(&part_name, &root);
    }
    Ok(merged)
}

/// Rebuild the `{{main_content}}` paragraph as a single clean run.
///
/// The first paragraph whose text contains `main_content` has its children
/// replaced by the preserved paragraph properties and one placeholder run.
/// Returns 1 when a paragraph was rebuilt, 0 otherwise.
///
/// # Errors
///
/// Returns an error if either package cannot be read or written.
pub fn fix_main_content(input: &Path, output: &Path) -> Result<usize, TemplateError> {
    let mut package = DocxPackage::open(input)?;
    let rebuilt = rebuild_content_paragraph(&mut package)?;
    package.save(output)?;
    Ok(rebuilt)
}

/// In-memory form of [`fix_main_content`].
///
/// # Errors
///
/// Returns an error if the document part is missing or unparsable.
pub fn rebuild_content_paragraph(package: &mut DocxPackage) -> Result<usize, TemplateError> {
    let mut document = package.xml_part(DOCUMENT_PART)?;
    let rebuilt = usize::from(rebuild_first_content_paragraph(&mut document));
    package.set_xml_part(DOCUMENT_PART, &document);
    Ok(rebuilt)
}

/// Merge windows of runs whose text concatenates to exactly `token`.
///
/// Only an accumulation equal to the bare token is merged; surrounding
/// text in the window leaves the paragraph untouched. Tabs and breaks in
/// the affected runs stay in place, only text nodes are rewritten.
fn merge_exact_token(paragraph: &mut XmlNode, token: &str) -> usize {
    let mut texts = Vec::new();
    collect_run_texts(paragraph, &mut texts);

    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i < texts.len() {
        let mut acc = String::new();
        let limit = texts.len().min(i + MERGE_WINDOW);
        for (j, text) in texts.iter().enumerate().take(limit).skip(i) {
            acc.push_str(text);
            if acc.contains(token) {
                if acc == token {
                    spans.push((i, j));
                    i = j;
                }
                break;
            }
        }
        i += 1;
    }

    if !spans.is_empty() {
        let mut ordinal = 0;
        rewrite_runs(paragraph, &mut ordinal, &mut |index, run| {
            for &(start, end) in &spans {
                if index == start {
                    set_cover_run_text(run, token);
                } else if index > start && index <= end {
                    set_cover_run_text(run, "");
                }
            }
        });
    }
    spans.len()
}

/// Concatenated text of each run under `node`, in document order.
fn collect_run_texts(node: &XmlNode, out: &mut Vec<String>) {
    for child in &node.children {
        if child.local() == "r" {
            out.push(paragraph_text(child));
        } else {
            collect_run_texts(child, out);
        }
    }
}

/// Apply a closure to each run under `node`, numbered in document order.
fn rewrite_runs<F>(node: &mut XmlNode, ordinal: &mut usize, apply: &mut F)
where
    F: FnMut(usize, &mut XmlNode),
{
    for child in &mut node.children {
        if child.local() == "r" {
            apply(*ordinal, child);
            *ordinal += 1;
        } else {
            rewrite_runs(child, ordinal, apply);
        }
    }
}

/// Set the run's first text node, dropping the others.
///
/// Unlike [`set_run_text`] this keeps tabs and breaks, so cover layout
/// around the title survives the merge.
fn set_cover_run_text(run: &mut XmlNode, text: &str) {
    let mut first = true;
    retain_first_text_node(run, text, &mut first);
    if first {
        run.children.push(XmlNode::new("w:t").with_text(text));
    }
}

fn retain_first_text_node(node: &mut XmlNode, text: &str, first: &mut bool) {
    node.children.retain_mut(|child| {
        if child.local() == "t" {
            if *first {
                *first = false;
                child.text = text.to_owned();
                true
            } else {
                false
            }
        } else {
            retain_first_text_node(child, text, first);
            true
        }
    });
}

/// Repeatedly merge the first split placeholder among the paragraph's
/// direct runs until none is actionable.
fn merge_paragraph_placeholders(paragraph: &mut XmlNode) -> usize {
    let mut merges = 0;
    loop {
        let run_positions: Vec<usize> = paragraph
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| child.local() == "r")
            .map(|(position, _)| position)
            .collect();
        if run_positions.is_empty() {
            break;
        }

        let mut full_text = String::new();
        let mut byte_to_run = Vec::new();
        for (ordinal, &position) in run_positions.iter().enumerate() {
            let piece = flattened_run_text(&paragraph.children[position]);
            byte_to_run.extend(std::iter::repeat_n(ordinal, piece.len()));
            full_text.push_str(&piece);
        }

        let Some((first, last)) = split_placeholder_span(&full_text, &byte_to_run) else {
            break;
        };
        if run_positions[first..=last]
            .iter()
            .any(|&position| !is_simple_run(&paragraph.children[position]))
        {
            break;
        }

        let merged_text: String = run_positions[first..=last]
            .iter()
            .map(|&position| flattened_run_text(&paragraph.children[position]))
            .collect();
        set_run_text(&mut paragraph.children[run_positions[first]], &merged_text);
        for &position in run_positions[first + 1..=last].iter().rev() {
            paragraph.children.remove(position);
        }
        merges += 1;
    }
    merges
}

/// A run's text with its tab and break marks flattened to `\t` and `\n`.
///
/// Each mark kind contributes once, after the text, matching how the
/// merged run is rebuilt.
fn flattened_run_text(run: &XmlNode) -> String {
    let mut out = String::new();
    for child in &run.children {
        if child.local() == "t" {
            out.push_str(&child.text);
        }
    }
    if run.children.iter().any(|c| c.local() == "tab") {
        out.push('\t');
    }
    if run.children.iter().any(|c| c.local() == "br") {
        out.push('\n');
    }
    if run.children.iter().any(|c| c.local() == "cr") {
        out.push('\n');
    }
    out
}

/// First placeholder match spanning more than one run.
///
/// A match contained in a single run is blanked out and the search runs
/// once more, so one intact placeholder does not hide a split one later
/// in the same paragraph.
fn split_placeholder_span(full_text: &str, byte_to_run: &[usize]) -> Option<(usize, usize)> {
    let matched = HEADER_PLACEHOLDER_RE.find(full_text)?;
    let mut first = byte_to_run[matched.start()];
    let mut last = byte_to_run[matched.end() - 1];
    if first == last {
        let mut blanked = full_text.to_owned();
        blanked.replace_range(matched.range(), &" ".repeat(matched.len()));
        let second = HEADER_PLACEHOLDER_RE.find(&blanked)?;
        first = byte_to_run[second.start()];
        last = byte_to_run[second.end() - 1];
        if first == last {
            return None;
        }
    }
    Some((first, last))
}

/// Rebuild the first paragraph mentioning `main_content`, keeping its
/// paragraph properties.
fn rebuild_first_content_paragraph(node: &mut XmlNode) -> bool {
    if node.local() == "p" && paragraph_text(node).contains("main_content") {
        let properties = node.children.iter().find(|c| c.local() == "pPr").cloned();
        node.children.clear();
        if let Some(properties) = properties {
            node.children.push(properties);
        }
        node.children.push(
            XmlNode::new("w:r")
                .with_child(XmlNode::new("w:t").with_text(CONTENT_PLACEHOLDER)),
        );
        return true;
    }
    node.children
        .iter_mut()
        .any(rebuild_first_content_paragraph)
}
