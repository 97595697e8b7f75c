//! `inkdoc fix` subcommand group.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use inkdoc_template::{fix_cover_title, fix_headers, fix_main_content};

use crate::error::CliError;
use crate::output::Output;

/// One-shot template repairs.
#[derive(Subcommand)]
pub(crate) enum FixCommand {
    /// Merge a cover title placeholder split across runs.
    CoverTitle(FixArgs),
    /// Merge split placeholders in header and footer parts.
    Headers(FixArgs),
    /// Rebuild the main content placeholder paragraph.
    MainContent(FixArgs),
}

/// Input and output paths shared by the repair commands.
#[derive(Args)]
pub(crate) struct FixArgs {
    /// Package to repair.
    pub(crate) input: PathBuf,

    /// Where the repaired package is written.
    pub(crate) output: PathBuf,
}

impl FixCommand {
    /// Execute the repair and report what changed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let written = match self {
            Self::CoverTitle(args) => {
                let merged = fix_cover_title(&args.input, &args.output)?;
                output.success(&format!(
                    "[OK] merged cover title placeholder runs: {merged}"
                ));
                args.output
            }
            Self::Headers(args) => {
                let merged = fix_headers(&args.input, &args.output)?;
                output.success(&format!(
                    "[OK] merged placeholder runs in header/footer: {merged}"
                ));
                args.output
            }
            Self::MainContent(args) => {
                let rebuilt = fix_main_content(&args.input, &args.output)?;
                output.success(&format!(
                    "[OK] forced rebuilt main_content paragraph: {rebuilt}"
                ));
                args.output
            }
        };
        output.success(&format!("[OK] wrote: {}", written.display()));
        Ok(())
    }
}
