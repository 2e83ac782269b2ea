//! Error type for the command-line tool

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can make a command fail
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be loaded
    #[error("Failed to load config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: norflash_core::config::ConfigError,
    },

    /// The driver reported a failure
    #[error("Flash error (code {code}): {0}", code = .0.code())]
    Flash(#[from] norflash_core::Error),

    /// Options that do not make sense together
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Progress bar template error
    #[error("Progress bar: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
