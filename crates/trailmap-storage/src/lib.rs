//! trailmap-storage: persistence for learning-path documents.
//!
//! Defines the [`PathStore`] contract (create/save/load/delete/list over
//! whole documents), the storage-layer identity and listing types, and the
//! in-memory backend used by tests and ephemeral editor sessions.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use memory::InMemoryStore;
pub use traits::PathStore;
pub use types::{PathId, PathSummary};
