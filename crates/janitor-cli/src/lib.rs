//! AWS Janitor CLI library.
//!
//! Argument parsing, layered configuration, logging setup and output
//! formatting for the `aws-janitor` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{Config, StateLocation};
pub use error::{CliError, Result};
pub use output::Formatter;
