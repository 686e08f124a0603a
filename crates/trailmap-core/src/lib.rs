//! trailmap-core: the learning-path graph document model.
//!
//! A learning path is a directed graph of steps (activities, milestones,
//! breaks) between a start and an end anchor. This crate owns the document
//! ([`LearningPath`]), its structural mutation primitives, the wire format,
//! and the derived-state passes (reachability order, completion propagation,
//! the flattened step ordering).
//!
//! Persistence lives in `trailmap-storage`; the interactive editing session
//! (viewport, interaction, dirty tracking, enrichment) lives in
//! `trailmap-editor`.

pub mod catalog;
pub mod error;
pub mod id;
pub mod node;
pub mod path;
pub mod traverse;

pub use catalog::{ActivityDescriptor, CatalogFilter};
pub use error::PathError;
pub use id::NodeId;
pub use node::{
    ActivityDetails, MetadataPatch, Node, NodeKind, NodeMetadata, NodePatch, Position,
};
pub use path::LearningPath;
pub use traverse::{bfs_depths, ordered_steps, CompletionPolicy, Reachability};
