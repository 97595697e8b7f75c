//! Rendering into a .docx template.
//!
//! The template carries three placeholders: `{{software_name}}` and
//! `{{version}}` as plain text in the document and header/footer parts, and
//! one `{{main_content}}` paragraph in the body that the rendered Markdown
//! replaces. Placeholders split across several runs are left alone; the
//! lint and fix commands exist to find and repair those templates.

use std::path::Path;

use inkdoc_ooxml::DocxPackage;
use inkdoc_ooxml::package::{DOCUMENT_PART, SETTINGS_PART, STYLES_PART};
use inkdoc_ooxml::runs::paragraph_text;
use inkdoc_ooxml::styles::StyleTable;
use inkdoc_ooxml::xml::XmlNode;
use inkdoc_render::Subdocument;

use crate::error::TemplateError;
use crate::lower::lower_blocks;
use crate::media::{MediaAllocator, max_drawing_id};

/// Placeholder for the software name.
pub const SOFTWARE_NAME_PLACEHOLDER: &str = "{{software_name}}";
/// Placeholder for the version label.
pub const VERSION_PLACEHOLDER: &str = "{{version}}";
/// Placeholder paragraph replaced by the rendered content.
pub const CONTENT_PLACEHOLDER: &str = "{{main_content}}";

/// A .docx template opened for rendering.
#[derive(Debug)]
pub struct DocxTemplate {
    package: DocxPackage,
    styles: StyleTable,
}

impl DocxTemplate {
    /// Open a template file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a .docx
    /// package.
    pub fn open(path: &Path) -> Result<Self, TemplateError> {
        Ok(Self::from_package(DocxPackage::open(path)?))
    }

    /// Wrap an already loaded package.
    ///
    /// A missing or unparsable styles part leaves the style table empty, so
    /// every block lowers without an explicit style.
    #[must_use]
    pub fn from_package(package: DocxPackage) -> Self {
        let styles = package
            .xml_part(STYLES_PART)
            .map(|root| StyleTable::from_part(&root))
            .unwrap_or_default();
        Self { package, styles }
    }

    /// Styles defined by the template.
    #[must_use]
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The underlying package.
    #[must_use]
    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// Fill the template with the given values and rendered content.
    ///
    /// # Errors
    ///
    /// Returns an error if the document part is unreadable, an image cannot
    /// be embedded, or no paragraph carries the content placeholder.
    pub fn render(
        &mut self,
        software_name: &str,
        version: &str,
        content: &Subdocument,
    ) -> Result<(), TemplateError> {
        self.substitute_scalars(software_name, version)?;

        let mut document = self.package.xml_part(DOCUMENT_PART)?;
        let first_drawing_id = max_drawing_id(&document) + 1;
        let mut media = MediaAllocator::new(&mut self.package, first_drawing_id)?;
        let blocks = lower_blocks(content, &self.styles, &mut media)?;

        let mut blocks = Some(blocks);
        if !splice_content(&mut document, &mut blocks) {
            return Err(TemplateError::ContentPlaceholderMissing);
        }
        self.package.set_xml_part(DOCUMENT_PART, &document);

        self.ensure_update_fields()?;
        Ok(())
    }

    /// Write the filled package to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if archive writing or the file write fails.
    pub fn save(&self, path: &Path) -> Result<(), TemplateError> {
        self.package.save(path)?;
        Ok(())
    }

    /// Replace scalar placeholders in the document and header/footer parts.
    fn substitute_scalars(
        &mut self,
        software_name: &str,
        version: &str,
    ) -> Result<(), TemplateError> {
        let replacements = [
            (SOFTWARE_NAME_PLACEHOLDER, software_name),
            (VERSION_PLACEHOLDER, version),
        ];
        let part_names: Vec<String> = self
            .package
            .part_names()
            .filter(|name| is_scalar_part(name))
            .map(str::to_owned)
            .collect();
        for part_name in part_names {
            let mut root = self.package.xml_part(&part_name)?;
            replace_in_text_nodes(&mut root, &replacements);
            self.package.set_xml_part(&part_name, &root);
        }
        Ok(())
    }

    /// Mark fields stale so Word refreshes the table of contents on open.
    fn ensure_update_fields(&mut self) -> Result<(), TemplateError> {
        if !self.package.has_part(SETTINGS_PART) {
            tracing::debug!("No settings part, skipping the update-fields flag");
            return Ok(());
        }
        let mut settings = self.package.xml_part(SETTINGS_PART)?;
        if settings.child_local("updateFields").is_none() {
            settings.children.insert(
                0,
                XmlNode::new("w:updateFields").with_attr("w:val", "true"),
            );
            self.package.set_xml_part(SETTINGS_PART, &settings);
        }
        Ok(())
    }
}

/// Parts taking part in scalar substitution.
fn is_scalar_part(name: &str) -> bool {
    name == DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// Replace placeholder occurrences within single text nodes.
fn replace_in_text_nodes(node: &mut XmlNode, replacements: &[(&str, &str)]) {
    if node.local() == "t" {
        for (token, value) in replacements {
            if node.text.contains(token) {
                node.text = node.text.replace(token, value);
            }
        }
    }
    for child in &mut node.children {
        replace_in_text_nodes(child, replacements);
    }
}

/// Replace the first paragraph containing the content placeholder with the
/// lowered blocks, searching tables and text boxes too.
fn splice_content(node: &mut XmlNode, blocks: &mut Option<Vec<XmlNode>>) -> bool {
    let target = node.children.iter().position(|child| {
        child.local() == "p" && paragraph_text(child).contains(CONTENT_PLACEHOLDER)
    });
    if let Some(index) = target
        && let Some(blocks) = blocks.take()
    {
        node.children.splice(index..=index, blocks);
        return true;
    }
    node.children
        .iter_mut()
        .any(|child| splice_content(child, blocks))
}
