//! `inkdoc convert` command implementation.

use std::path::PathBuf;

use clap::Args;
use inkdoc_config::{Config, default_env_files};
use inkdoc_render::render_markdown;
use inkdoc_template::{DocxTemplate, output_filename};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown manual to convert.
    pub(crate) markdown: PathBuf,

    /// Software name substituted into the template cover and headers.
    #[arg(short, long)]
    pub(crate) name: String,

    /// Version label substituted into the template.
    #[arg(long)]
    pub(crate) version_label: String,

    /// Directory the generated document lands in (created if needed).
    #[arg(short, long)]
    pub(crate) workdir: Option<PathBuf>,

    /// Template .docx path (overrides the INKDOC_TEMPLATE variable).
    #[arg(short, long)]
    pub(crate) template: Option<PathBuf>,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(&default_env_files());
        let template_path = config.template_path(self.template.as_deref())?;

        output.info(&format!("Source: {}", self.markdown.display()));
        output.info(&format!("Template: {}", template_path.display()));

        let content = render_markdown(&self.markdown)?;

        let mut template = DocxTemplate::open(&template_path)?;
        template.render(&self.name, &self.version_label, &content)?;

        let out_dir = match self.workdir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                dir
            }
            None => PathBuf::from("."),
        };
        let out_path = out_dir.join(output_filename(&self.name, &self.version_label));
        template.save(&out_path)?;

        output.success(&format!("Generated {}", out_path.display()));
        Ok(())
    }
}
