//! Error types for storage operations

use lepkehalo_core::AppError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing stored values
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key cannot be mapped to a storage location
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    /// Failed to read a stored value
    #[error("Failed to read key '{key}': {source}")]
    Read {
        key: String,
        source: std::io::Error,
    },

    /// Failed to write a value
    #[error("Failed to write key '{key}': {source}")]
    Write {
        key: String,
        source: std::io::Error,
    },

    /// Failed to create the storage directory
    #[error("Failed to create storage directory at {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Returns the key involved, if the error concerns a single key
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::InvalidKey(key)
            | StorageError::Read { key, .. }
            | StorageError::Write { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Read { key, source } => AppError::StorageReadFailed {
                key,
                message: source.to_string(),
            },
            StorageError::Write { key, source } => AppError::StorageWriteFailed {
                key,
                message: source.to_string(),
            },
            StorageError::InvalidKey(key) => AppError::InvalidArgument {
                argument: "key".to_string(),
                reason: format!("'{}' is not a valid storage key", key),
            },
            other => AppError::StorageUnavailable {
                reason: other.to_string(),
            },
        }
    }
}
