//! Self-checks for .docx templates and generated documents.
//!
//! Templates that went through manual editing tend to accumulate two kinds
//! of rot: placeholders split across runs by revision tracking or IME
//! input, and paragraphs restyled in places the body style does not belong.
//! Generated output can additionally leak external references. The checks
//! here find both groups and print a line-per-issue report.

mod checks;
mod error;
mod issue;
mod report;

pub use checks::{LintMode, LintOptions, lint_file, lint_package};
pub use error::LintError;
pub use issue::Issue;
pub use report::{DEFAULT_MAX_ISSUES, write_report};
