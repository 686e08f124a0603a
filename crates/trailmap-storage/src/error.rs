//! Storage error types.

use thiserror::Error;

use crate::types::PathId;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Encoding or decoding a stored path document failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No stored path with the given id.
    #[error("path not found: {id}")]
    PathNotFound { id: PathId },

    /// Backend-specific failure (I/O, quota, a remote store being down).
    #[error("storage backend error: {0}")]
    Backend(String),
}
