//! The storage contract.

use trailmap_core::LearningPath;

use crate::error::StorageError;
use crate::types::{PathId, PathSummary};

/// A persistence backend for learning paths.
///
/// The contract is synchronous and whole-document: `save` replaces the
/// stored document atomically, `load` returns an independent copy. Backends
/// are swappable behind this trait; [`InMemoryStore`](crate::InMemoryStore)
/// is the first-class in-process implementation.
pub trait PathStore {
    /// Creates and stores a fresh path with the given name, returning its id
    /// and the new document.
    fn create(&mut self, name: &str) -> Result<(PathId, LearningPath), StorageError>;

    /// Stores a snapshot of the document under `id`. `saved_at_ms` is the
    /// caller's wall-clock time in epoch milliseconds.
    fn save(
        &mut self,
        id: &PathId,
        path: &LearningPath,
        saved_at_ms: u64,
    ) -> Result<(), StorageError>;

    /// Loads the stored document under `id`.
    fn load(&self, id: &PathId) -> Result<LearningPath, StorageError>;

    /// Deletes the stored document under `id`. Returns `false` if there was
    /// nothing to delete.
    fn delete(&mut self, id: &PathId) -> Result<bool, StorageError>;

    /// Lists summaries of every stored path, most recently saved first.
    fn list(&self) -> Result<Vec<PathSummary>, StorageError>;
}
