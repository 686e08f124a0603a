//! Activity catalog provider.
//!
//! The catalog is an external, read-only collaborator: the editor lists
//! descriptors from it (for the palette and for enrichment) and never writes
//! back. [`InMemoryCatalog`] is the in-process backend used by tests and
//! offline sessions.

use thiserror::Error;
use trailmap_core::{ActivityDescriptor, CatalogFilter};

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog backend could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub trait ActivityCatalogProvider {
    /// Lists activity descriptors matching the filter.
    fn list(&self, filter: &CatalogFilter) -> Result<Vec<ActivityDescriptor>, CatalogError>;
}

/// One catalog record plus the flags the filter can select on.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub descriptor: ActivityDescriptor,
    pub active: bool,
    pub scope: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        InMemoryCatalog { entries }
    }

    /// Adds an active, unscoped descriptor.
    pub fn push(&mut self, descriptor: ActivityDescriptor) {
        self.entries.push(CatalogEntry {
            descriptor,
            active: true,
            scope: None,
        });
    }
}

impl ActivityCatalogProvider for InMemoryCatalog {
    fn list(&self, filter: &CatalogFilter) -> Result<Vec<ActivityDescriptor>, CatalogError> {
        let needle = filter.search_term.as_deref().map(str::to_lowercase);
        Ok(self
            .entries
            .iter()
            .filter(|entry| !filter.active_only || entry.active)
            .filter(|entry| match &filter.scope {
                Some(scope) => entry.scope.as_deref() == Some(scope.as_str()),
                None => true,
            })
            .filter(|entry| match &needle {
                Some(needle) => {
                    entry.descriptor.name.to_lowercase().contains(needle)
                        || entry.descriptor.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .map(|entry| entry.descriptor.clone())
            .collect())
    }
}
