use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored ledger could not be encoded or decoded
    #[error("Invalid ledger data: {0}")]
    Codec(#[from] serde_json::Error),

    /// Remote or injected backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}
