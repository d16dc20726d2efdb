//! Shared CLI plumbing: error kinds, exit codes and output helpers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::services::HttpCatalogClient;

/// Process exit code of a CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Invalid input or unknown names
    Validation = 1,
    /// Local file or serialization failure
    Io = 2,
    /// Catalog service unreachable or rejected the request
    Network = 3,
}

impl ExitCode {
    /// Numeric code passed to the OS.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.code())
    }
}

/// Failure category of a CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input
    Validation,
    /// Local I/O
    Io,
    /// Remote service
    Network,
}

/// Error reported by a CLI command.
#[derive(Debug)]
pub struct CliError {
    /// Failure category
    pub kind: ErrorKind,
    /// Message shown to the user
    pub message: String,
}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    /// Local I/O failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: message.into(),
        }
    }

    /// Remote service failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            ErrorKind::Validation => ExitCode::Validation,
            ErrorKind::Io => ExitCode::Io,
            ErrorKind::Network => ExitCode::Network,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Overrides `api.base_url` from the config file
    pub api_url: Option<String>,
}

impl GlobalOptions {
    /// Loads the config file and applies command-line overrides.
    pub fn load_config(&self) -> CliResult<Config> {
        let mut config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        if let Some(url) = &self.api_url {
            config.api.base_url.clone_from(url);
            config
                .validate()
                .map_err(|e| CliError::validation(format!("{e:#}")))?;
        }
        Ok(config)
    }

    /// Builds a catalog client from the effective configuration.
    pub fn connect(&self, config: &Config) -> CliResult<Arc<HttpCatalogClient>> {
        HttpCatalogClient::new(&config.api.base_url, config.api.timeout())
            .map(Arc::new)
            .map_err(|e| CliError::validation(format!("{e:#}")))
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize output to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
