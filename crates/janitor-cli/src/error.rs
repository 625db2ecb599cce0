//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Janitor error
    #[error(transparent)]
    Janitor(#[from] janitor_core::JanitorError),

    /// AWS error outside a scan (credentials, state location)
    #[error("AWS error: {0}")]
    Aws(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// The command ran but reported errors
    #[error("{0} error(s) during the run")]
    Failed(usize),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Usage mistakes exit with 2, like clap's own argument errors; anything
    /// that went wrong while running exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidInput(_) | CliError::NotPermitted(_) => 2,
            _ => 1,
        }
    }
}
