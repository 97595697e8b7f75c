//! .docx package reading and writing.
//!
//! A package is held as an ordered list of named parts so that a load/save
//! round trip keeps the original part order.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::OoxmlError;
use crate::xml::{self, XmlNode};

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Style definitions part.
pub const STYLES_PART: &str = "word/styles.xml";
/// Document settings part.
pub const SETTINGS_PART: &str = "word/settings.xml";
/// Content types manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Relationships of the main document part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// A .docx package held in memory.
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Read a package from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a ZIP archive.
    pub fn open(path: &Path) -> Result<Self, OoxmlError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Read a package from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, OoxmlError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
            file.read_to_end(&mut data)?;
            parts.push((file.name().to_owned(), data));
        }
        Ok(Self { parts })
    }

    /// Part names in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Raw bytes of a part.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Whether a part exists.
    #[must_use]
    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replace a part's bytes, appending the part if it is new.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(entry) = self.parts.iter_mut().find(|(n, _)| n == name) {
            entry.1 = data;
        } else {
            self.parts.push((name.to_owned(), data));
        }
    }

    /// Parse a part as an XML tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the part is missing or not well-formed XML.
    pub fn xml_part(&self, name: &str) -> Result<XmlNode, OoxmlError> {
        let data = self
            .part(name)
            .ok_or_else(|| OoxmlError::MissingPart(name.to_owned()))?;
        let content = std::str::from_utf8(data)?;
        xml::parse_document(content)
    }

    /// Serialize an XML tree back into a part.
    pub fn set_xml_part(&mut self, name: &str, root: &XmlNode) {
        self.set_part(name, xml::serialize_document(root).into_bytes());
    }

    /// Write the package as ZIP bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if archive writing fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OoxmlError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }
        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if archive writing or the file write fails.
    pub fn save(&self, path: &Path) -> Result<(), OoxmlError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
