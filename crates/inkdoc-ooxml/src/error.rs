//! Error types for package and XML handling.

/// Error while reading, parsing, or writing a .docx package.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OoxmlError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Part content is not valid UTF-8.
    #[error("part is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Document part contained no root element.
    #[error("empty XML document")]
    EmptyDocument,

    /// Referenced package part does not exist.
    #[error("package part not found: {0}")]
    MissingPart(String),
}
