//! CLI error types.

use inkdoc_config::ConfigError;
use inkdoc_lint::LintError;
use inkdoc_render::RenderError;
use inkdoc_template::TemplateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Lint(#[from] LintError),
}
