//! Detached activity-detail enrichment.
//!
//! Activity nodes carry a presentational `activityDetails` block that is
//! resolved lazily against the catalog. The cycle is ticket-based so a
//! completion that arrives late can never write into the wrong session
//! state:
//!
//! 1. [`EnrichmentQueue::request`] issues a [`Ticket`] stamped with the
//!    queue's current generation.
//! 2. The caller resolves the ticket's query against the catalog (possibly
//!    much later) via [`resolve`].
//! 3. [`EnrichmentQueue::complete`] applies the detail only if the ticket's
//!    generation is still current and the node still exists. Everything
//!    else is a soft no-op: the optional field just stays empty.
//!
//! Teardown and restores bump the generation, invalidating every
//! outstanding ticket at once.

use trailmap_core::{ActivityDescriptor, ActivityDetails, LearningPath, Node, NodeId};

/// Minimum normalized Jaro-Winkler similarity for a fuzzy name match.
const FUZZY_THRESHOLD: f64 = 0.85;

/// What the resolver has to work with, captured at request time.
#[derive(Debug, Clone)]
pub struct EnrichmentQuery {
    pub activity_id: Option<String>,
    pub title: String,
}

/// A pending enrichment, valid for one queue generation.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub node: NodeId,
    pub query: EnrichmentQuery,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct EnrichmentQueue {
    generation: u64,
}

impl EnrichmentQueue {
    pub fn new() -> Self {
        EnrichmentQueue::default()
    }

    /// Issues a ticket for a node. Non-activity nodes have nothing to
    /// enrich, so they get no ticket.
    pub fn request(&self, node: &Node) -> Option<Ticket> {
        if node.kind != trailmap_core::NodeKind::Activity {
            return None;
        }
        Some(Ticket {
            node: node.id.clone(),
            query: EnrichmentQuery {
                activity_id: node.metadata.activity_id.clone(),
                title: node.title.clone(),
            },
            generation: self.generation,
        })
    }

    /// Invalidates every outstanding ticket (teardown, restore).
    pub fn invalidate_all(&mut self) {
        self.generation += 1;
    }

    /// Applies a resolved detail through a ticket. Returns `true` if the
    /// document was written; a stale ticket or a deleted node is a silent
    /// no-op.
    pub fn complete(&self, ticket: &Ticket, details: ActivityDetails, path: &mut LearningPath) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(node = %ticket.node, "stale enrichment ticket dropped");
            return false;
        }
        path.set_activity_details(&ticket.node, details)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolves a query against a catalog listing.
///
/// Resolution order: exact id match, then the title's 4-digit `DDDD-`
/// ordinal prefix tried as a catalog key, then exact name match on the
/// title with the prefix stripped, then the best fuzzy name match at or
/// above the similarity threshold. `None` is a soft miss.
pub fn resolve<'a>(
    catalog: &'a [ActivityDescriptor],
    query: &EnrichmentQuery,
) -> Option<&'a ActivityDescriptor> {
    if let Some(id) = &query.activity_id {
        if let Some(hit) = catalog.iter().find(|d| &d.id == id) {
            return Some(hit);
        }
    }

    if let Some(prefix) = ordinal_prefix(&query.title) {
        if let Some(hit) = catalog.iter().find(|d| d.id == prefix) {
            return Some(hit);
        }
    }

    let title = strip_ordinal_prefix(&query.title);
    let normalized = normalize(title);
    if let Some(hit) = catalog.iter().find(|d| normalize(&d.name) == normalized) {
        return Some(hit);
    }

    catalog
        .iter()
        .map(|d| (strsim::jaro_winkler(&normalize(&d.name), &normalized), d))
        .filter(|(score, _)| *score >= FUZZY_THRESHOLD)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, d)| d)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// The 4 digits of a `DDDD-` ordinal title prefix, if present.
fn ordinal_prefix(title: &str) -> Option<&str> {
    let bytes = title.as_bytes();
    if bytes.len() >= 5
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
    {
        Some(&title[..4])
    } else {
        None
    }
}

fn strip_ordinal_prefix(title: &str) -> &str {
    match ordinal_prefix(title) {
        Some(_) => &title[5..],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmap_core::Position;

    fn catalog() -> Vec<ActivityDescriptor> {
        vec![
            ActivityDescriptor {
                id: "act-1".into(),
                name: "Fire building".into(),
                ..Default::default()
            },
            ActivityDescriptor {
                id: "act-2".into(),
                name: "Knot tying".into(),
                ..Default::default()
            },
        ]
    }

    fn query(activity_id: Option<&str>, title: &str) -> EnrichmentQuery {
        EnrichmentQuery {
            activity_id: activity_id.map(str::to_string),
            title: title.to_string(),
        }
    }

    #[test]
    fn resolves_by_id_first() {
        let catalog = catalog();
        let hit = resolve(&catalog, &query(Some("act-2"), "Fire building")).unwrap();
        assert_eq!(hit.id, "act-2");
    }

    #[test]
    fn resolves_the_title_prefix_as_a_catalog_key() {
        let catalog = vec![ActivityDescriptor {
            id: "0042".into(),
            name: "Completely different name".into(),
            ..Default::default()
        }];
        let hit = resolve(&catalog, &query(None, "0042-Fire building")).unwrap();
        assert_eq!(hit.id, "0042");
    }

    #[test]
    fn resolves_by_title_with_ordinal_prefix_stripped() {
        let catalog = catalog();
        let hit = resolve(&catalog, &query(None, "0003-fire building")).unwrap();
        assert_eq!(hit.id, "act-1");
    }

    #[test]
    fn resolves_close_names_fuzzily_and_misses_softly() {
        let catalog = catalog();
        let hit = resolve(&catalog, &query(None, "Knot tyng")).unwrap();
        assert_eq!(hit.id, "act-2");

        assert!(resolve(&catalog, &query(None, "Archery")).is_none());
    }

    #[test]
    fn stale_ticket_is_a_noop() {
        let mut path = LearningPath::new("p");
        let desc = catalog().remove(0);
        let id = path.add_activity_node(&desc, Position::default());

        let mut queue = EnrichmentQueue::new();
        let node = path.node(&id).unwrap().clone();
        let ticket = queue.request(&node).unwrap();
        queue.invalidate_all();

        assert!(!queue.complete(&ticket, ActivityDetails::from(&desc), &mut path));
        assert!(path.node(&id).unwrap().metadata.activity_details.is_none());
    }

    #[test]
    fn completion_after_node_deletion_is_a_noop() {
        let mut path = LearningPath::new("p");
        let desc = catalog().remove(0);
        let id = path.add_activity_node(&desc, Position::default());

        let queue = EnrichmentQueue::new();
        let ticket = queue.request(path.node(&id).unwrap()).unwrap();
        path.delete_node(&id);

        assert!(!queue.complete(&ticket, ActivityDetails::from(&desc), &mut path));
    }

    #[test]
    fn completion_writes_details_without_dirtying_the_document() {
        let mut path = LearningPath::new("p");
        let desc = catalog().remove(0);
        let id = path.add_activity_node(&desc, Position::default());
        let revision = path.revision();

        let queue = EnrichmentQueue::new();
        let ticket = queue.request(path.node(&id).unwrap()).unwrap();
        assert!(queue.complete(&ticket, ActivityDetails::from(&desc), &mut path));

        let node = path.node(&id).unwrap();
        assert_eq!(
            node.metadata.activity_details.as_ref().unwrap().activity_id,
            "act-1"
        );
        assert_eq!(path.revision(), revision);
    }
}
