//! XML tree model for OOXML parts.
//!
//! Parses a part into a tree of [`XmlNode`] values and serializes it back.
//! Attribute order and namespace declarations are preserved so a part that
//! is read and written without modification stays equivalent for Word.

use std::fmt::Write;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::OoxmlError;

/// XML declaration written at the top of every serialized part.
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// Node in a parsed XML part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element tag name, prefix included (e.g. `w:p`).
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after the element (XML tail).
    pub tail: String,
    /// Attributes in document order, names as written.
    pub attrs: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create a new node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<XmlNode>) -> Self {
        self.children = children;
        self
    }

    /// Tag name without its namespace prefix.
    #[must_use]
    pub fn local(&self) -> &str {
        local_name(&self.tag)
    }

    /// Attribute value by exact name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, ignoring the prefix.
    #[must_use]
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| local_name(k) == local)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name.to_owned(), value));
        }
    }

    /// First direct child with the given local name.
    #[must_use]
    pub fn child_local(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local() == local)
    }
}

/// Strip a namespace prefix from a tag or attribute name.
#[must_use]
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Parse a complete XML part into its root node.
///
/// The XML declaration, comments, and processing instructions are dropped;
/// everything else round-trips through [`serialize_document`].
///
/// # Errors
///
/// Returns an error if the content is not well-formed XML or contains no
/// root element.
pub fn parse_document(content: &str) -> Result<XmlNode, OoxmlError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let attrs = decode_attrs(&reader, &e);
                let mut root = parse_children(&mut reader, &tag)?;
                root.tag = tag;
                root.attrs = attrs;
                return Ok(root);
            }
            Event::Empty(e) => {
                let root = XmlNode {
                    tag: decode_name(&reader, e.name().as_ref()),
                    attrs: decode_attrs(&reader, &e),
                    ..Default::default()
                };
                return Ok(root);
            }
            Event::Eof => return Err(OoxmlError::EmptyDocument),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse child events until the matching end tag.
fn parse_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent_tag: &str,
) -> Result<XmlNode, OoxmlError> {
    let mut buf = Vec::new();
    let mut node = XmlNode::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let child_tag = decode_name(reader, e.name().as_ref());
                let child_attrs = decode_attrs(reader, &e);
                let mut child = parse_children(reader, &child_tag)?;
                child.tag = child_tag;
                child.attrs = child_attrs;
                node.children.push(child);
            }
            Event::Empty(e) => {
                let child = XmlNode {
                    tag: decode_name(reader, e.name().as_ref()),
                    attrs: decode_attrs(reader, &e),
                    ..Default::default()
                };
                node.children.push(child);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?.into_owned();
                append_text(&mut node, &decode_entity(&entity));
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut node, &text);
            }
            Event::End(e) => {
                let end_tag = decode_name(reader, e.name().as_ref());
                if end_tag == parent_tag {
                    return Ok(node);
                }
            }
            Event::Eof => return Ok(node),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = reader.decoder().decode(attr.key.as_ref()).map_or_else(
            |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            std::borrow::Cow::into_owned,
        );
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.push((key, value));
    }
    attrs
}

/// Append text to the node's text or the last child's tail.
fn append_text(node: &mut XmlNode, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode XML entity references to their character values.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        // Numeric character references
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}

/// Serialize a root node back to a complete part, declaration included.
#[must_use]
pub fn serialize_document(root: &XmlNode) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    serialize_node(root, &mut out);
    out
}

/// Serialize a single node recursively.
fn serialize_node(node: &XmlNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);

    for (key, value) in &node.attrs {
        let _ = write!(out, r#" {}="{}""#, key, escape_attr(value));
    }

    if node.children.is_empty() && node.text.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        if !node.text.is_empty() {
            out.push_str(&escape_text(&node.text));
        }
        for child in &node.children {
            serialize_node(child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }

    if !node.tail.is_empty() {
        out.push_str(&escape_text(&node.tail));
    }
}

/// Escape text for XML content.
fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

/// Escape XML special characters.
fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_element() {
        let root = parse_document("<w:t>Hello</w:t>").unwrap();
        assert_eq!(root.tag, "w:t");
        assert_eq!(root.text, "Hello");
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_parse_nested_elements() {
        let root = parse_document("<w:r><w:rPr/><w:t>text</w:t></w:r>").unwrap();
        assert_eq!(root.tag, "w:r");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].tag, "w:rPr");
        assert_eq!(root.children[1].text, "text");
    }

    #[test]
    fn test_parse_keeps_namespace_declarations() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#;
        let root = parse_document(xml).unwrap();
        assert_eq!(
            root.attr("xmlns:w"),
            Some("http://schemas.openxmlformats.org/wordprocessingml/2006/main")
        );
    }

    #[test]
    fn test_parse_attributes_in_order() {
        let root = parse_document(r#"<w:style w:type="paragraph" w:styleId="H1"/>"#).unwrap();
        assert_eq!(
            root.attrs,
            vec![
                ("w:type".to_owned(), "paragraph".to_owned()),
                ("w:styleId".to_owned(), "H1".to_owned()),
            ]
        );
        assert_eq!(root.attr_local("styleId"), Some("H1"));
    }

    #[test]
    fn test_parse_entities() {
        let root = parse_document("<w:t>a &lt;b&gt; &amp; c</w:t>").unwrap();
        assert_eq!(root.text, "a <b> & c");
    }

    #[test]
    fn test_parse_numeric_entity() {
        let root = parse_document("<w:t>&#x4E2D;&#25991;</w:t>").unwrap();
        assert_eq!(root.text, "中文");
    }

    #[test]
    fn test_parse_tail_text() {
        let root = parse_document("<w:p><w:br/>after</w:p>").unwrap();
        assert_eq!(root.children[0].tag, "w:br");
        assert_eq!(root.children[0].tail, "after");
    }

    #[test]
    fn test_parse_skips_declaration_and_comments() {
        let xml = "<?xml version=\"1.0\"?><!-- note --><root><a/></root>";
        let root = parse_document(xml).unwrap();
        assert_eq!(root.tag, "root");
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_parse_empty_document_is_error() {
        assert!(matches!(
            parse_document("  "),
            Err(OoxmlError::EmptyDocument)
        ));
    }

    #[test]
    fn test_serialize_self_closing() {
        let node = XmlNode::new("w:br");
        let out = serialize_document(&node);
        assert_eq!(out, format!("{XML_DECLARATION}<w:br/>"));
    }

    #[test]
    fn test_serialize_escapes_text_and_attrs() {
        let node = XmlNode::new("w:t")
            .with_attr("w:val", "a\"b")
            .with_text("1 < 2 & 3");
        let out = serialize_document(&node);
        assert!(out.contains(r#"w:val="a&quot;b""#));
        assert!(out.contains("1 &lt; 2 &amp; 3"));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let xml = concat!(
            r#"<w:document xmlns:w="http://example.org/w">"#,
            r#"<w:body><w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr>"#,
            r#"<w:r><w:t xml:space="preserve"> spaced </w:t></w:r>"#,
            "<w:r><w:tab/><w:t>after tab</w:t></w:r>",
            "</w:p></w:body></w:document>",
        );
        let root = parse_document(xml).unwrap();
        let out = serialize_document(&root);
        let reparsed = parse_document(&out).unwrap();
        assert_eq!(root, reparsed);
    }

    #[test]
    fn test_attr_and_child_lookup() {
        let root =
            parse_document(r#"<w:pPr><w:pStyle w:val="Body"/><w:keepNext/></w:pPr>"#).unwrap();
        let style = root.child_local("pStyle").unwrap();
        assert_eq!(style.attr("w:val"), Some("Body"));
        assert_eq!(style.attr_local("val"), Some("Body"));
        assert!(root.child_local("jc").is_none());
    }

    #[test]
    fn test_set_attr_replaces_existing() {
        let mut node = XmlNode::new("w:updateFields").with_attr("w:val", "false");
        node.set_attr("w:val", "true");
        assert_eq!(node.attr("w:val"), Some("true"));
        assert_eq!(node.attrs.len(), 1);
    }
}
