//! Error types for Janitor operations

use janitor_domain::ResourceError;
use janitor_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Janitor operations
///
/// Scan-time errors are collected per scope in the scan report rather than
/// returned; only configuration and worker failures abort an operation.
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Persisted state could not be loaded; nothing in the scope was touched
    #[error("Failed to load state for {scope}: {source}")]
    StateLoad {
        /// Scope key
        scope: String,
        /// Underlying storage failure
        #[source]
        source: StoreError,
    },

    /// Persisted state could not be saved after the scan
    #[error("Failed to save state for {scope}: {source}")]
    StateSave {
        /// Scope key
        scope: String,
        /// Underlying storage failure
        #[source]
        source: StoreError,
    },

    /// An adapter pass failed
    #[error("{resource_type} failed in {scope}: {source}")]
    Resource {
        /// Scope key
        scope: String,
        /// Adapter name
        resource_type: &'static str,
        /// Adapter failure
        #[source]
        source: ResourceError,
    },

    /// An adapter pass exceeded the per-call timeout
    #[error("{resource_type} timed out after {timeout_secs}s in {scope}")]
    Timeout {
        /// Scope key
        scope: String,
        /// Adapter name
        resource_type: &'static str,
        /// Configured timeout
        timeout_secs: u64,
    },

    /// The scan was cancelled before the scope finished
    #[error("Scan of {scope} cancelled")]
    Cancelled {
        /// Scope key
        scope: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl JanitorError {
    /// Whether this error records a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JanitorError::Cancelled { .. })
    }
}
