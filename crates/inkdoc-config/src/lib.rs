//! Configuration management for inkdoc.
//!
//! Loads `.env`-style key/value files and resolves the document template
//! path. Process environment variables always take precedence over file
//! entries; within and across files the first occurrence of a key wins.
//!
//! File format:
//!
//! - `KEY=VALUE` per line, split at the first `=`
//! - blank lines and lines starting with `#` are skipped
//! - surrounding single or double quotes are stripped from the value

use std::path::{Path, PathBuf};

/// Environment variable naming the .docx template file.
pub const TEMPLATE_VAR: &str = "INKDOC_TEMPLATE";

/// Filename of the key/value files searched next to the executable and in
/// the working directory.
const ENV_FILENAME: &str = ".env";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Template variable unset and no override given.
    #[error("template path not configured: set {TEMPLATE_VAR} or pass --template")]
    TemplateUnset,
    /// Template path does not point at an existing file.
    #[error("template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/value entries loaded from `.env` files.
///
/// Lookups via [`Config::resolve`] consult the process environment first, so
/// loaded entries never shadow variables the caller already exported.
#[derive(Debug, Default)]
pub struct Config {
    entries: Vec<(String, String)>,
}

impl Config {
    /// Load entries from the given files in order.
    ///
    /// Unreadable files are skipped with a warning; a missing file is not an
    /// error. Earlier files take precedence over later ones.
    #[must_use]
    pub fn load(paths: &[PathBuf]) -> Self {
        let mut config = Self::default();
        for path in paths {
            match std::fs::read_to_string(path) {
                Ok(content) => config.parse_content(&content),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!("skipping env file {}: {err}", path.display());
                }
            }
        }
        config
    }

    /// Parse one file's content, keeping only first occurrences.
    fn parse_content(&mut self, content: &str) {
        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !key.is_empty() && self.get(key).is_none() {
                self.entries.push((key.to_owned(), value.to_owned()));
            }
        }
    }

    /// Look up a key among the loaded file entries only.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a key, preferring the process environment over file entries.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.get(key).map(str::to_owned),
        }
    }

    /// Resolve the .docx template path.
    ///
    /// An explicit `override_path` wins over the [`TEMPLATE_VAR`] lookup.
    /// Relative paths are resolved against the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured or the file does not exist.
    pub fn template_path(&self, override_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let configured = match override_path {
            Some(path) => path.to_path_buf(),
            None => {
                let value = self
                    .resolve(TEMPLATE_VAR)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::TemplateUnset)?;
                PathBuf::from(value.trim())
            }
        };
        let resolved = if configured.is_absolute() {
            configured
        } else {
            std::env::current_dir()?.join(configured)
        };
        if !resolved.is_file() {
            return Err(ConfigError::TemplateNotFound(resolved));
        }
        Ok(resolved)
    }
}

/// Default `.env` search locations: next to the executable, then the
/// working directory.
#[must_use]
pub fn default_env_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        paths.push(dir.join(ENV_FILENAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(ENV_FILENAME));
    }
    paths
}
