//! Storage-layer identity and listing types.
//!
//! `PathId` wraps the document id of a stored path; `PathSummary` is the
//! cheap listing row a picker UI renders without loading full documents.
//! Timestamps are epoch milliseconds supplied by the caller, so backends
//! never need a clock of their own.

use std::fmt;

use serde::{Deserialize, Serialize};
use trailmap_core::LearningPath;

/// Identifier of a stored learning path (the document's own id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(pub String);

impl PathId {
    pub fn new(id: impl Into<String>) -> Self {
        PathId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&LearningPath> for PathId {
    fn from(path: &LearningPath) -> Self {
        PathId(path.id.clone())
    }
}

/// One row in the stored-path listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSummary {
    pub id: PathId,
    pub name: String,
    pub node_count: usize,
    /// Minutes, from the document aggregate.
    pub total_duration: u32,
    pub difficulty: u8,
    /// Epoch milliseconds of the last save.
    pub saved_at_ms: u64,
}

impl PathSummary {
    /// Builds the summary row for a document at save time.
    pub fn of(path: &LearningPath, saved_at_ms: u64) -> Self {
        PathSummary {
            id: PathId::from(path),
            name: path.name.clone(),
            node_count: path.node_count(),
            total_duration: path.total_duration,
            difficulty: path.difficulty,
            saved_at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reflects_document_aggregates() {
        let mut path = LearningPath::new("Trail basics");
        path.add_node(trailmap_core::NodeKind::Milestone, Default::default());

        let summary = PathSummary::of(&path, 1_700_000_000_000);
        assert_eq!(summary.id.as_str(), path.id);
        assert_eq!(summary.name, "Trail basics");
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.total_duration, 30);
        assert_eq!(summary.saved_at_ms, 1_700_000_000_000);
    }
}
