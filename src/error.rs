//! Error types for the eclipkit library.

use thiserror::Error;

/// Errors that can occur during eclipkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON document could not be read or written.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A tab-separated table could not be read or written.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A parse error occurred while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),

    /// A file format error was detected.
    #[error("{0}")]
    Format(String),

    /// The annotation service could not be reached or answered with a failure.
    /// Callers that resolve metadata downgrade this to a warning.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// A single input row did not match the expected column layout.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    /// The invocation itself is unusable (no sources, missing files).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
