//! Stable ID newtype for path nodes.
//!
//! Node ids are opaque strings, generated as UUID v4 so ids stay globally
//! unique across paths and editing sessions. The newtype keeps node identity
//! from being confused with titles or other string fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable node identifier within a learning path.
///
/// Serializes as a bare string, matching the path document wire format where
/// `connections` is an array of id strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a NodeId from an existing string id.
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    /// Generates a fresh globally unique id.
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}
