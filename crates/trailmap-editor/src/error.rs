//! Editor session errors.
//!
//! Only persistence failures are hard errors here. Structural rejections
//! stay silent no-ops inside the document model, and enrichment misses are
//! soft by contract.

use thiserror::Error;
use trailmap_storage::StorageError;

#[derive(Debug, Error)]
pub enum EditorError {
    /// Saving the path failed; the in-memory document is unchanged and the
    /// dirty flag stays set.
    #[error("save failed: {0}")]
    Save(StorageError),

    /// Loading a stored path failed.
    #[error("load failed: {0}")]
    Load(StorageError),
}
