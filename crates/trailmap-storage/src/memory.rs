//! In-memory storage backend.
//!
//! First-class backend for tests and ephemeral sessions, with semantics
//! identical to a durable backend: documents are stored as their serialized
//! wire form, so a load exercises the same decode path a file or network
//! store would.

use std::collections::HashMap;

use trailmap_core::LearningPath;

use crate::error::StorageError;
use crate::traits::PathStore;
use crate::types::{PathId, PathSummary};

#[derive(Debug, Clone)]
struct StoredPath {
    json: String,
    summary: PathSummary,
}

/// HashMap-backed [`PathStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    paths: HashMap<PathId, StoredPath>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl PathStore for InMemoryStore {
    fn create(&mut self, name: &str) -> Result<(PathId, LearningPath), StorageError> {
        let path = LearningPath::new(name);
        let id = PathId::from(&path);
        self.save(&id, &path, 0)?;
        tracing::debug!(%id, name, "created path");
        Ok((id, path))
    }

    fn save(
        &mut self,
        id: &PathId,
        path: &LearningPath,
        saved_at_ms: u64,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(path)?;
        let summary = PathSummary::of(path, saved_at_ms);
        self.paths.insert(id.clone(), StoredPath { json, summary });
        Ok(())
    }

    fn load(&self, id: &PathId) -> Result<LearningPath, StorageError> {
        let stored = self
            .paths
            .get(id)
            .ok_or_else(|| StorageError::PathNotFound { id: id.clone() })?;
        Ok(serde_json::from_str(&stored.json)?)
    }

    fn delete(&mut self, id: &PathId) -> Result<bool, StorageError> {
        Ok(self.paths.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<PathSummary>, StorageError> {
        let mut rows: Vec<PathSummary> =
            self.paths.values().map(|p| p.summary.clone()).collect();
        rows.sort_by(|a, b| b.saved_at_ms.cmp(&a.saved_at_ms));
        Ok(rows)
    }
}
