//! Error types for orgtree-jsonl operations.

use std::io;
use thiserror::Error;

/// The error type for orgtree-jsonl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line could not be parsed as the expected record type.
    #[error("line {line}: {source}")]
    Parse {
        /// The 1-based line number of the offending line.
        line: usize,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid JSONL format.
    #[error("Invalid JSONL format: {0}")]
    InvalidFormat(String),
}

/// A specialized Result type for orgtree-jsonl operations.
pub type Result<T> = std::result::Result<T, Error>;
