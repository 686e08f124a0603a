//! Activity catalog wire shapes.
//!
//! The activity catalog is an external collaborator: it hands the editor
//! read-only [`ActivityDescriptor`]s, and the editor maps them 1:1 onto
//! activity nodes. The provider trait itself lives in the editor crate;
//! only the data shapes are core.

use serde::{Deserialize, Serialize};

/// A read-only activity record from the external catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub instructions: String,
}

/// Filter passed to the catalog provider when listing activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Only return activities still marked active in the catalog.
    #[serde(default)]
    pub active_only: bool,
    /// Optional catalog scope (e.g. an organization or program id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Free-text search over names and descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl CatalogFilter {
    /// Filter that lists every active activity, unscoped.
    pub fn active() -> Self {
        CatalogFilter {
            active_only: true,
            ..CatalogFilter::default()
        }
    }
}
