//! Style table parsed from `word/styles.xml`.
//!
//! Paragraph styles are referenced by id in document XML but named by their
//! display name in authoring tools, so both directions are needed: linting
//! maps ids back to names, template merging maps candidate names to ids.

use crate::xml::XmlNode;

/// Style kind as declared by the `w:type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    /// Paragraph style.
    Paragraph,
    /// Character style.
    Character,
    /// Table style.
    Table,
    /// Numbering style.
    Numbering,
    /// Missing or unrecognized type attribute.
    Unknown,
}

impl StyleKind {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("paragraph") => Self::Paragraph,
            Some("character") => Self::Character,
            Some("table") => Self::Table,
            Some("numbering") => Self::Numbering,
            _ => Self::Unknown,
        }
    }
}

/// One style definition.
#[derive(Debug, Clone)]
pub struct StyleInfo {
    /// Style id referenced from document XML.
    pub id: String,
    /// Display name shown in authoring tools.
    pub name: String,
    /// Declared style kind.
    pub kind: StyleKind,
}

/// All styles of a package in definition order.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    styles: Vec<StyleInfo>,
}

impl StyleTable {
    /// Collect style definitions from a parsed `word/styles.xml` tree.
    ///
    /// Definitions missing an id or a name are skipped.
    #[must_use]
    pub fn from_part(root: &XmlNode) -> Self {
        let mut styles = Vec::new();
        collect(root, &mut styles);
        Self { styles }
    }

    /// Display name of a style id.
    #[must_use]
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    /// Style id of a display name, filtered by kind.
    #[must_use]
    pub fn id_of(&self, name: &str, kind: StyleKind) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.kind == kind && s.name == name)
            .map(|s| s.id.as_str())
    }

    /// First candidate display name defined in the table, as a style id.
    #[must_use]
    pub fn resolve(&self, candidates: &[&str], kind: StyleKind) -> Option<&str> {
        candidates.iter().find_map(|name| self.id_of(name, kind))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn collect(node: &XmlNode, styles: &mut Vec<StyleInfo>) {
    for child in &node.children {
        if child.local() == "style" {
            let id = child.attr_local("styleId");
            let name = child
                .child_local("name")
                .and_then(|n| n.attr_local("val"));
            if let (Some(id), Some(name)) = (id, name) {
                styles.push(StyleInfo {
                    id: id.to_owned(),
                    name: name.to_owned(),
                    kind: StyleKind::from_attr(child.attr_local("type")),
                });
            }
        } else {
            collect(child, styles);
        }
    }
}
