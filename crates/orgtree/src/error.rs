//! Error types for orgtree operations.
//!
//! Each layer has its own enum: [`StoreError`] for backends, [`ConfigError`]
//! for credential loading, and [`Error`] for the operations built on top.
//! The binary wraps [`Error`] in `anyhow` and exits non-zero on any of them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for orgtree operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be established.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A collection could not be read.
    #[error("Failed to read collection '{collection}': {source}")]
    StoreRead {
        /// The collection being read.
        collection: String,
        /// The backend failure.
        #[source]
        source: StoreError,
    },

    /// A document could not be written.
    #[error("Failed to write document '{id}' in collection '{collection}': {source}")]
    StoreWrite {
        /// The collection being written.
        collection: String,
        /// The document being written.
        id: String,
        /// The backend failure.
        #[source]
        source: StoreError,
    },

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account provisioning failed.
    #[error("Provisioning error: {0}")]
    Provision(String),
}

/// Configuration errors. All are fatal and raised before any store access.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `--credentials` nor the environment variable was given.
    #[error(
        "No credentials configured: pass --credentials <PATH> or set {}",
        crate::config::CREDENTIALS_ENV
    )]
    MissingCredentials,

    /// The credential file could not be read.
    #[error("Cannot read credentials file {}: {source}", path.display())]
    Unreadable {
        /// Path of the credential file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The credential file was read but is not usable.
    #[error("Invalid credentials file {}: {message}", path.display())]
    Invalid {
        /// Path of the credential file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },
}

/// Errors raised by document store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error in a file-backed store.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSONL encoding or decoding failed.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] orgtree_jsonl::Error),

    /// An update targeted a document that does not exist.
    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound {
        /// The collection searched.
        collection: String,
        /// The missing document id.
        id: String,
    },

    /// The data directory of a file-backed store does not exist.
    #[error("Data directory {} does not exist", .0.display())]
    DataDirMissing(PathBuf),

    /// A collection could not be read to the end.
    #[error("Collection '{collection}' could not be read completely: {detail}")]
    IncompleteRead {
        /// The collection being read.
        collection: String,
        /// The read failure that ended the scan.
        detail: String,
    },

    /// A collection name that cannot be mapped onto the backend.
    #[error("Invalid collection name '{0}'")]
    InvalidCollection(String),

    /// A stored document is structurally unusable.
    #[error("Invalid document in collection '{collection}': {message}")]
    InvalidDocument {
        /// The collection holding the document.
        collection: String,
        /// What is wrong with it.
        message: String,
    },
}

impl StoreError {
    /// Convenience constructor for [`StoreError::DocumentNotFound`].
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// A specialized Result type for orgtree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result type for store backends.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_names_the_env_var() {
        let msg = Error::from(ConfigError::MissingCredentials).to_string();
        assert!(msg.contains("--credentials"));
        assert!(msg.contains(crate::config::CREDENTIALS_ENV));
    }

    #[test]
    fn write_error_names_document_and_cause() {
        let err = Error::StoreWrite {
            collection: "managers".to_string(),
            id: "u7".to_string(),
            source: StoreError::not_found("managers", "u7"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'u7'"));
        assert!(msg.contains("not found"));
    }
}
