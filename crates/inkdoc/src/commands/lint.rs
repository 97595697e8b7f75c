//! `inkdoc lint` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use inkdoc_lint::{DEFAULT_MAX_ISSUES, LintMode, LintOptions, lint_file, write_report};

use crate::error::CliError;

/// Arguments for the lint command.
#[derive(Args)]
pub(crate) struct LintArgs {
    /// Template or generated .docx to check.
    pub(crate) docx: PathBuf,

    /// Check group to run: template, output, or all.
    #[arg(long, default_value = "template")]
    pub(crate) mode: LintMode,

    /// Comma-separated style display names treated as body styles.
    #[arg(long, default_value = "Normal,正文")]
    pub(crate) body_styles: String,

    /// Maximum issue lines to print.
    #[arg(long = "max", default_value_t = DEFAULT_MAX_ISSUES)]
    pub(crate) max_issues: usize,
}

impl LintArgs {
    /// Run the checks and print the report to stdout.
    ///
    /// Returns the process exit code: 0 for a clean package, 2 when issues
    /// were found, 1 when the file does not exist.
    pub(crate) fn execute(self) -> Result<i32, CliError> {
        let mut stdout = std::io::stdout().lock();

        if !self.docx.exists() {
            writeln!(stdout, "[ERROR] file not found: {}", self.docx.display())?;
            return Ok(1);
        }

        let options = LintOptions {
            mode: self.mode,
            body_styles: parse_body_styles(&self.body_styles),
        };
        let issues = lint_file(&self.docx, &options)?;
        write_report(&mut stdout, &issues, self.max_issues)?;
        Ok(if issues.is_empty() { 0 } else { 2 })
    }
}

/// Split a comma-separated style list, dropping blank entries.
fn parse_body_styles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}
