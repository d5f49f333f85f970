//! Storage error types
//!
//! `BackendError` is what an `ObjectBackend` reports. `StorageError` is what
//! the client surfaces: one kind per failing step, with the backend error kept
//! as the source.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by an object backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Key cannot be stored verbatim: {0:?}")]
    InvalidKey(String),

    #[error("Bucket not served by this backend: {0}")]
    UnknownBucket(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Transport(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Source file unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Write failed for {key}: {source}")]
    StoreWriteFailed {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Delete failed for {key}: {source}")]
    StoreDeleteFailed {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Read failed for {key}: {source}")]
    StoreReadFailed {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Listing bucket {bucket} failed: {source}")]
    StoreListFailed {
        bucket: String,
        #[source]
        source: BackendError,
    },

    #[error("Configuration error: {0}")]
    ConfigurationInvalid(String),
}

impl StorageError {
    /// Whether the backend reported that the object does not exist.
    ///
    /// The error kind stays `StoreReadFailed`/`StoreDeleteFailed` either way.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::StoreReadFailed {
                source: BackendError::NotFound(_),
                ..
            } | StorageError::StoreDeleteFailed {
                source: BackendError::NotFound(_),
                ..
            }
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
