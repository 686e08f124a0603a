//! End-to-end session flow: open a stored path, build it out through the
//! session surface, let the debounced passes run, enrich an activity from
//! the catalog, save, and revert.

use std::time::{Duration, Instant};

use trailmap_core::{
    ActivityDescriptor, ActivityDetails, CatalogFilter, NodeKind, Position,
};
use trailmap_editor::{
    resolve, ActivityCatalogProvider, EditorSession, InMemoryCatalog, ViewMode, ZoomDirection,
};
use trailmap_storage::{InMemoryStore, PathStore};

fn catalog() -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::default();
    catalog.push(ActivityDescriptor {
        id: "act-fire".into(),
        name: "Fire building".into(),
        description: "Build a safe cooking fire".into(),
        duration_minutes: Some(45),
        difficulty_level: Some(2),
        ..Default::default()
    });
    catalog
}

#[test]
fn edit_recalculate_enrich_save_and_revert() {
    let mut store = InMemoryStore::new();
    let (path_id, _) = store.create("Campcraft").unwrap();
    let mut session = EditorSession::open(&path_id, Box::new(store), 2000.0, 1200.0).unwrap();

    let t0 = Instant::now();
    let catalog = catalog();

    // Build: start -> activity -> milestone.
    let descriptors = catalog.list(&CatalogFilter::active()).unwrap();
    let activity = session.add_activity_node(&descriptors[0], Position::new(500.0, 600.0), t0);
    let milestone = session
        .add_node(NodeKind::Milestone, Position::new(900.0, 600.0), t0)
        .unwrap();
    let start = session.path().start_node_id().clone();
    session.connect_nodes(&start, &activity, t0);
    session.connect_nodes(&activity, &milestone, t0);

    // The debounced recalculation annotates order, completion, and the
    // ordinal title.
    session.tick(t0 + Duration::from_millis(400));
    let node = session.path().node(&activity).unwrap();
    assert_eq!(node.order, 1);
    assert!(node.is_completed);
    assert_eq!(node.title, "0001-Fire building");
    assert_eq!(session.path().node(&milestone).unwrap().order, 2);
    assert!(session.has_unsaved_changes());

    // Enrichment: ticket out, resolve against the catalog, apply.
    let ticket = session.request_enrichment(&activity).unwrap();
    let hit = resolve(&descriptors, &ticket.query).unwrap();
    assert!(session.apply_enrichment(&ticket, ActivityDetails::from(hit)));
    assert_eq!(
        session
            .path()
            .node(&activity)
            .unwrap()
            .metadata
            .activity_details
            .as_ref()
            .unwrap()
            .name,
        "Fire building"
    );

    // Save, then make and discard a further edit.
    session.save(1_700_000_000_000).unwrap();
    assert!(!session.has_unsaved_changes());

    session.delete_node(&milestone, t0);
    assert!(!session.path().contains(&milestone));
    session.reset();
    assert!(session.path().contains(&milestone));
    assert!(!session.has_unsaved_changes());
}

#[test]
fn preview_session_cannot_change_the_document() {
    let mut session = EditorSession::new(
        trailmap_core::LearningPath::new("readonly"),
        Box::new(InMemoryStore::new()),
        2000.0,
        1200.0,
    );
    session.set_view_mode(ViewMode::Preview);
    let t0 = Instant::now();

    let start = session.path().start_node_id().clone();
    let revision = session.path().revision();

    // Pointer gestures select but never mutate.
    session.pointer_down_node(&start, 150.0, 600.0, false, t0);
    session.pointer_move(600.0, 600.0, t0);
    session.pointer_up();
    session.key_delete(t0);

    assert_eq!(session.path().revision(), revision);
}

#[test]
fn viewport_operations_flow_through_the_session() {
    let mut session = EditorSession::new(
        trailmap_core::LearningPath::new("view"),
        Box::new(InMemoryStore::new()),
        2000.0,
        1200.0,
    );

    session.pan(400.0, -5000.0);
    assert_eq!(session.viewport().offset(), (400.0, -1000.0));

    for _ in 0..30 {
        session.zoom_at(1000.0, 600.0, ZoomDirection::In);
    }
    assert_eq!(session.viewport().zoom(), 3.0);

    session.fit_to_content();
    // Anchors sit at (150, 600) and (1850, 600): at zoom 3 the padded box
    // no longer fits, so fit reduces the zoom.
    assert!(session.viewport().zoom() < 3.0);
}
