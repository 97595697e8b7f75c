//! Error type for template rendering and repair.

use std::path::PathBuf;

/// Error while rendering into or repairing a .docx template.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TemplateError {
    /// Package or XML error.
    #[error(transparent)]
    Ooxml(#[from] inkdoc_ooxml::OoxmlError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The template has no paragraph carrying the content placeholder.
    #[error("template has no {{{{main_content}}}} paragraph")]
    ContentPlaceholderMissing,

    /// An image could not be read or decoded.
    #[error("cannot embed image {}: {source}", path.display())]
    Image {
        /// Image path as referenced by the Markdown source.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The image bytes matched no known format.
    #[error("unrecognized image format: {}", .0.display())]
    UnknownImageFormat(PathBuf),

    /// The image decoded to zero width, so no aspect ratio exists.
    #[error("image has no width: {}", .0.display())]
    EmptyImage(PathBuf),
}
