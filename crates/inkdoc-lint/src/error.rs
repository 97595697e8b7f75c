use std::path::PathBuf;

/// Errors raised while checking a package.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LintError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Ooxml(#[from] inkdoc_ooxml::OoxmlError),

    #[error("unknown lint mode {0:?}, expected template, output, or all")]
    UnknownMode(String),
}
