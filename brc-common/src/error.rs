//! Common error types for BRC

use thiserror::Error;

/// Common result type for BRC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the BRC workspace
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The key-list provider could not be read; fatal before any download
    #[error("Key source unavailable: {0}")]
    SourceUnavailable(String),

    /// The report could not be persisted; fatal, run results are lost
    #[error("Report write failed: {0}")]
    ReportWrite(String),
}
