//! trailmap-editor: the interactive learning-path editing session.
//!
//! Wraps a `trailmap_core::LearningPath` in everything an editing surface
//! needs: viewport math, the canvas interaction state machine, debounced
//! dirty tracking and reachability recalculation, catalog-backed activity
//! enrichment, and persistence through a `trailmap_storage::PathStore`.
//!
//! The crate is UI-agnostic and single-threaded: a rendering layer feeds
//! pointer/keyboard events and `Instant`s in, and listens for
//! [`EditorEvent`]s.

pub mod catalog;
pub mod debounce;
pub mod enrichment;
pub mod error;
pub mod interaction;
pub mod session;
pub mod tracker;
pub mod viewport;

pub use catalog::{ActivityCatalogProvider, CatalogEntry, CatalogError, InMemoryCatalog};
pub use debounce::Debounce;
pub use enrichment::{resolve, EnrichmentQueue, EnrichmentQuery, Ticket};
pub use error::EditorError;
pub use interaction::{Effect, Interaction, InteractionMode, Selection, ViewMode};
pub use session::{EditorEvent, EditorSession, DIRTY_DEBOUNCE, RECALC_DEBOUNCE};
pub use tracker::ChangeTracker;
pub use viewport::{Viewport, ZoomDirection};
