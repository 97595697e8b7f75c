//! OOXML plumbing shared by the inkdoc tools.
//!
//! A .docx file is a ZIP package of XML parts. This crate provides the
//! in-memory package model, an XML tree that round-trips individual parts,
//! run text streams with character-to-run maps, and the style table parsed
//! from `word/styles.xml`.
//!
//! Only what template merging, linting, and repair need is implemented
//! here; this is not a general OOXML writer.

mod error;
pub mod package;
pub mod runs;
pub mod styles;
pub mod xml;

pub use error::OoxmlError;
pub use package::DocxPackage;
