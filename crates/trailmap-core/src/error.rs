//! Core error types for trailmap-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Note that
//! structural rejections (self-loops, duplicate edges, anchor deletion) are
//! NOT errors -- they are silent no-ops by design and only show up as debug
//! logs. `PathError` covers document decode failures and strict validation.

use thiserror::Error;

use crate::id::NodeId;
use crate::node::NodeKind;

/// Errors produced when decoding or strictly validating a path document.
#[derive(Debug, Error)]
pub enum PathError {
    /// JSON decode of a path document failed (includes duplicate node ids,
    /// which the node-array deserializer rejects).
    #[error("document decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A connection references a node id that does not exist in the path.
    #[error("dangling connection: {from} -> {to}")]
    DanglingConnection { from: NodeId, to: NodeId },

    /// The document has no node of the given anchor kind.
    #[error("missing {kind:?} anchor")]
    MissingAnchor { kind: NodeKind },
}
