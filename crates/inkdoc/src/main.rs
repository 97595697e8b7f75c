//! inkdoc CLI - Markdown to Word manual converter.
//!
//! Provides commands for:
//! - `convert`: Render a Markdown manual into a .docx from the configured template
//! - `lint`: Check a template or generated document for common defects
//! - `fix`: One-shot repairs for damaged templates

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, FixCommand, LintArgs};
use output::Output;

/// inkdoc - Markdown to Word manual converter.
#[derive(Parser)]
#[command(name = "inkdoc", version, about)]
struct Cli {
    /// Enable info-level log output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown manual into a .docx from the configured template.
    Convert(ConvertArgs),
    /// Check a template or generated document and print a report.
    Lint(LintArgs),
    /// Repair a damaged template.
    #[command(subcommand)]
    Fix(FixCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables info-level events, otherwise RUST_LOG applies.
    // Log lines go to stderr so the lint report owns stdout.
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute().map(|()| 0),
        Commands::Lint(args) => args.execute(),
        Commands::Fix(command) => command.execute().map(|()| 0),
    };

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(err) => {
            output.error(&format!("Error: {err}"));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::try_parse_from([
            "inkdoc",
            "convert",
            "manual.md",
            "--name",
            "示例系统",
            "--version-label",
            "V1.0",
            "--workdir",
            "out",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        assert_eq!(args.name, "示例系统");
        assert_eq!(args.version_label, "V1.0");
        assert_eq!(args.workdir.unwrap().to_str(), Some("out"));
        assert!(args.template.is_none());
    }

    #[test]
    fn test_parse_lint_defaults() {
        let cli = Cli::try_parse_from(["inkdoc", "lint", "t.docx"]).unwrap();
        let Commands::Lint(args) = cli.command else {
            panic!("expected the lint command");
        };
        assert_eq!(args.mode, inkdoc_lint::LintMode::Template);
        assert_eq!(args.body_styles, "Normal,正文");
        assert_eq!(args.max_issues, 200);
    }

    #[test]
    fn test_parse_fix_subcommands() {
        let cli = Cli::try_parse_from(["inkdoc", "fix", "cover-title", "in.docx", "out.docx"])
            .unwrap();
        let Commands::Fix(FixCommand::CoverTitle(args)) = cli.command else {
            panic!("expected the cover-title repair");
        };
        assert_eq!(args.input.to_str(), Some("in.docx"));
        assert_eq!(args.output.to_str(), Some("out.docx"));
    }

    #[test]
    fn test_unknown_lint_mode_is_rejected() {
        assert!(Cli::try_parse_from(["inkdoc", "lint", "t.docx", "--mode", "bogus"]).is_err());
    }
}
