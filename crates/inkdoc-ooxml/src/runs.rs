//! Run and paragraph text streams over WordprocessingML trees.
//!
//! A paragraph's visible text is spread over `w:r` runs whose children mix
//! text nodes, tabs, breaks, and field instructions. The helpers here
//! flatten that into one string with a per-character run index map, which
//! is what placeholder detection and run merging operate on.

use crate::xml::{XmlNode, local_name};

/// Characters contributed by non-text run children.
#[must_use]
pub fn special_char(local: &str) -> Option<char> {
    match local {
        "tab" => Some('\t'),
        "br" | "cr" => Some('\n'),
        "noBreakHyphen" => Some('\u{2011}'),
        "softHyphen" => Some('\u{00ad}'),
        _ => None,
    }
}

/// Concatenated text of one run.
///
/// Text nodes and field instruction text contribute verbatim; tabs, breaks,
/// and hyphen controls contribute their character equivalents.
#[must_use]
pub fn run_text(run: &XmlNode) -> String {
    let mut out = String::new();
    for child in &run.children {
        match child.local() {
            "t" | "instrText" => out.push_str(&child.text),
            local => {
                if let Some(ch) = special_char(local) {
                    out.push(ch);
                }
            }
        }
    }
    out
}

/// A paragraph's direct child runs in document order.
///
/// Runs nested in hyperlinks or other wrappers are not included; split
/// detection and run merging only touch runs the paragraph itself owns.
#[must_use]
pub fn paragraph_runs(paragraph: &XmlNode) -> Vec<&XmlNode> {
    paragraph
        .children
        .iter()
        .filter(|child| child.local() == "r")
        .collect()
}

/// A paragraph's flattened text with per-character run indices.
#[derive(Debug, Default)]
pub struct RunStream {
    /// Concatenated run text.
    pub text: String,
    /// Run index of each character of `text`.
    pub char_runs: Vec<usize>,
}

impl RunStream {
    /// Build the stream for a paragraph.
    #[must_use]
    pub fn of(paragraph: &XmlNode) -> Self {
        let mut stream = Self::default();
        for (index, run) in paragraph_runs(paragraph).iter().enumerate() {
            for ch in run_text(run).chars() {
                stream.text.push(ch);
                stream.char_runs.push(index);
            }
        }
        stream
    }

    /// First and last run index covered by a byte range of `text`.
    ///
    /// Returns `None` for an empty range.
    #[must_use]
    pub fn run_span(&self, range: std::ops::Range<usize>) -> Option<(usize, usize)> {
        if range.is_empty() {
            return None;
        }
        let first_char = self.text[..range.start].chars().count();
        let last_char = first_char + self.text[range.start..range.end].chars().count() - 1;
        let first = *self.char_runs.get(first_char)?;
        let last = *self.char_runs.get(last_char)?;
        Some((first, last))
    }
}

/// Concatenated `w:t` text of a paragraph's subtree.
#[must_use]
pub fn paragraph_text(paragraph: &XmlNode) -> String {
    let mut out = String::new();
    collect_text(paragraph, &mut out);
    out
}

fn collect_text(node: &XmlNode, out: &mut String) {
    for child in &node.children {
        if child.local() == "t" {
            out.push_str(&child.text);
        }
        collect_text(child, out);
    }
}

/// Visit every paragraph under `root` with its ancestor tag stack.
///
/// The stack holds the tags of all elements enclosing the paragraph, the
/// root included, outermost first.
pub fn visit_paragraphs<'a, F>(root: &'a XmlNode, f: &mut F)
where
    F: FnMut(&'a XmlNode, &[&'a str]),
{
    let mut stack: Vec<&'a str> = Vec::new();
    walk(root, &mut stack, f);
}

fn walk<'a, F>(node: &'a XmlNode, stack: &mut Vec<&'a str>, f: &mut F)
where
    F: FnMut(&'a XmlNode, &[&'a str]),
{
    if node.local() == "p" {
        f(node, stack);
    }
    stack.push(node.tag.as_str());
    for child in &node.children {
        walk(child, stack, f);
    }
    stack.pop();
}

/// Visit every paragraph under `root` mutably.
pub fn visit_paragraphs_mut<F>(node: &mut XmlNode, f: &mut F)
where
    F: FnMut(&mut XmlNode),
{
    if node.local() == "p" {
        f(node);
    }
    for child in &mut node.children {
        visit_paragraphs_mut(child, f);
    }
}

/// Style id referenced by a paragraph's `w:pPr/w:pStyle`, if any.
#[must_use]
pub fn paragraph_style_id(paragraph: &XmlNode) -> Option<&str> {
    paragraph
        .child_local("pPr")?
        .child_local("pStyle")?
        .attr_local("val")
}

/// True when the run contains only formatting and plain content children.
///
/// Runs carrying drawings, fields, or other structures must not be merged.
#[must_use]
pub fn is_simple_run(run: &XmlNode) -> bool {
    run.children
        .iter()
        .all(|c| matches!(c.local(), "rPr" | "t" | "tab" | "br" | "cr"))
}

/// Replace a run's content with a single text node.
///
/// Formatting children stay; text, tabs, and breaks are removed. The new
/// text node carries `xml:space="preserve"` when it has edge whitespace.
pub fn set_run_text(run: &mut XmlNode, text: &str) {
    run.children
        .retain(|c| !matches!(c.local(), "t" | "tab" | "br" | "cr"));
    if text.is_empty() {
        return;
    }
    let mut t = XmlNode::new("w:t").with_text(text);
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    run.children.push(t);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use pretty_assertions::assert_eq;

    fn paragraph(xml: &str) -> XmlNode {
        parse_document(xml).unwrap()
    }

    #[test]
    fn test_run_text_with_specials() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/>",
            "<w:noBreakHyphen/><w:softHyphen/></w:r></w:p>",
        ));
        let runs = paragraph_runs(&p);
        assert_eq!(run_text(runs[0]), "a\tb\n\u{2011}\u{00ad}");
    }

    #[test]
    fn test_run_text_includes_field_instructions() {
        let p = paragraph(r#"<w:p><w:r><w:instrText> PAGE </w:instrText></w:r></w:p>"#);
        let runs = paragraph_runs(&p);
        assert_eq!(run_text(runs[0]), " PAGE ");
    }

    #[test]
    fn test_stream_maps_chars_to_runs() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:t>{{so</w:t></w:r>",
            "<w:r><w:t>ftware}}</w:t></w:r></w:p>",
        ));
        let stream = RunStream::of(&p);
        assert_eq!(stream.text, "{{software}}");
        assert_eq!(stream.char_runs[0], 0);
        assert_eq!(stream.char_runs[3], 0);
        assert_eq!(stream.char_runs[4], 1);
        assert_eq!(stream.char_runs[11], 1);
    }

    #[test]
    fn test_run_span_over_multibyte_text() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:t>说明{{</w:t></w:r>",
            "<w:r><w:t>name}}</w:t></w:r></w:p>",
        ));
        let stream = RunStream::of(&p);
        let start = stream.text.find("{{").unwrap();
        let end = start + "{{name}}".len();
        assert_eq!(stream.run_span(start..end), Some((0, 1)));
        assert_eq!(stream.run_span(0..0), None);
    }

    #[test]
    fn test_hyperlink_runs_are_not_streamed() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:t>see </w:t></w:r>",
            r#"<w:hyperlink r:id="rId4"><w:r><w:t>here</w:t></w:r></w:hyperlink></w:p>"#,
        ));
        let stream = RunStream::of(&p);
        assert_eq!(stream.text, "see ");
        assert_eq!(paragraph_runs(&p).len(), 1);
    }

    #[test]
    fn test_paragraph_text_concatenates_t_nodes() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:t>one </w:t></w:r>",
            "<w:r><w:tab/><w:t>two</w:t></w:r></w:p>",
        ));
        assert_eq!(paragraph_text(&p), "one two");
    }

    #[test]
    fn test_visit_paragraphs_reports_ancestors() {
        let root = paragraph(concat!(
            "<w:hdr><w:tbl><w:tr><w:tc>",
            "<w:p><w:r><w:t>cell</w:t></w:r></w:p>",
            "</w:tc></w:tr></w:tbl></w:hdr>",
        ));
        let mut seen = Vec::new();
        visit_paragraphs(&root, &mut |p, ancestors| {
            seen.push((paragraph_text(p), ancestors.to_vec()));
        });
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "cell");
        assert_eq!(seen[0].1, vec!["w:hdr", "w:tbl", "w:tr", "w:tc"]);
    }

    #[test]
    fn test_visit_paragraphs_mut_reaches_nested() {
        let mut root = paragraph(concat!(
            "<w:body><w:p><w:r><w:t>a</w:t></w:r></w:p>",
            "<w:txbxContent><w:p><w:r><w:t>b</w:t></w:r></w:p></w:txbxContent></w:body>",
        ));
        let mut count = 0;
        visit_paragraphs_mut(&mut root, &mut |_| count += 1);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_paragraph_style_id() {
        let p = paragraph(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="BodyText"/></w:pPr>"#,
            "<w:r><w:t>x</w:t></w:r></w:p>",
        ));
        assert_eq!(paragraph_style_id(&p), Some("BodyText"));

        let plain = paragraph("<w:p><w:r><w:t>x</w:t></w:r></w:p>");
        assert_eq!(paragraph_style_id(&plain), None);
    }

    #[test]
    fn test_is_simple_run() {
        let p = paragraph(concat!(
            "<w:p><w:r><w:rPr/><w:t>x</w:t><w:tab/></w:r>",
            "<w:r><w:drawing/></w:r></w:p>",
        ));
        let runs = paragraph_runs(&p);
        assert!(is_simple_run(runs[0]));
        assert!(!is_simple_run(runs[1]));
    }

    #[test]
    fn test_set_run_text_keeps_formatting() {
        let mut run = parse_document(concat!(
            r#"<w:r><w:rPr><w:b/></w:rPr>"#,
            "<w:t>old</w:t><w:tab/><w:t>tail</w:t></w:r>",
        ))
        .unwrap();
        set_run_text(&mut run, "{{software_name}}");

        assert_eq!(run.children.len(), 2);
        assert_eq!(run.children[0].local(), "rPr");
        assert_eq!(run.children[1].text, "{{software_name}}");
        assert_eq!(run.children[1].attr("xml:space"), None);
    }

    #[test]
    fn test_set_run_text_preserves_edge_whitespace() {
        let mut run = parse_document("<w:r><w:t>old</w:t></w:r>").unwrap();
        set_run_text(&mut run, " padded ");
        assert_eq!(run.children[0].attr("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_set_run_text_empty_clears_content() {
        let mut run = parse_document("<w:r><w:rPr/><w:t>old</w:t></w:r>").unwrap();
        set_run_text(&mut run, "");
        assert_eq!(run.children.len(), 1);
        assert_eq!(run.children[0].local(), "rPr");
    }
}
