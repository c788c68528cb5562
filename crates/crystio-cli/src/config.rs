mod defaults;
mod file;

pub use file::FileConfig;

use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use crystio::core::io::{input_formats, output_formats};
use std::path::Path;
use tracing::debug;

/// Format choices after merging command line, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    pub read_format: String,
    pub write_format: Option<String>,
}

impl FormatConfig {
    /// Loads the optional config file and merges it with command-line values.
    pub fn load(
        config_path: Option<&Path>,
        cli_from: Option<&str>,
        cli_to: Option<&str>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(&file, cli_from, cli_to)
    }

    /// Resolves each value by precedence: command line, then file, then defaults.
    ///
    /// Names are checked against the registered formats so that a typo is reported
    /// before any file is touched.
    pub fn merge(file: &FileConfig, cli_from: Option<&str>, cli_to: Option<&str>) -> Result<Self> {
        let defaults = DefaultsConfig::default();

        let read_format = match (cli_from, file.read_format()) {
            (Some(name), _) => check_name(name, &input_formats(), "input").map_err(CliError::Argument)?,
            (None, Some(name)) => check_name(name, &input_formats(), "input").map_err(CliError::Config)?,
            (None, None) => defaults.read_format,
        };

        let write_format = match (cli_to, file.write_format()) {
            (Some(name), _) => Some(check_name(name, &output_formats(), "output").map_err(CliError::Argument)?),
            (None, Some(name)) => Some(check_name(name, &output_formats(), "output").map_err(CliError::Config)?),
            (None, None) => defaults.write_format,
        };

        let config = Self {
            read_format,
            write_format,
        };
        debug!("Resolved format configuration: {:?}", config);
        Ok(config)
    }
}

fn check_name(name: &str, allowed: &[&str], kind: &str) -> std::result::Result<String, String> {
    if allowed.contains(&name) {
        Ok(name.to_string())
    } else {
        Err(format!(
            "Unsupported {} format '{}'. Expected one of: {}.",
            kind,
            name,
            allowed.join(", ")
        ))
    }
}
