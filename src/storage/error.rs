//! Storage error types
//!
//! Defines all errors that can occur in the persistence layer.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted state
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The persisted value under a key could not be parsed
    #[error("Corrupt data under key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// NaN and infinities have no JSON representation
    #[error("Amount of entry {id} cannot be stored: {amount}")]
    NonFiniteAmount { id: String, amount: f64 },

    /// Key cannot be mapped onto the backend (empty, path separators, ...)
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
