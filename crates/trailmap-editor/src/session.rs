//! The interactive editing session.
//!
//! [`EditorSession`] owns the live document and every editing collaborator:
//! viewport, interaction state, dirty tracker, the two debounced timers
//! (dirty check and reachability recalculation), the enrichment queue, and
//! the persistence backend. A rendering layer drives it with pointer/key
//! events and a periodic [`tick`](EditorSession::tick), and observes it
//! through [`EditorEvent`] callbacks.
//!
//! The session is strictly single-threaded. Time is injected: callers pass
//! `Instant`s into every scheduling method and epoch milliseconds into
//! `save`, so tests never sleep.

use std::time::{Duration, Instant};

use trailmap_core::{
    ActivityDescriptor, ActivityDetails, CompletionPolicy, LearningPath, NodeId, NodeKind,
    NodePatch, Position, Reachability,
};
use trailmap_storage::{PathId, PathStore};

use crate::debounce::Debounce;
use crate::enrichment::{EnrichmentQueue, Ticket};
use crate::error::EditorError;
use crate::interaction::{Effect, Interaction, InteractionMode, Selection, ViewMode};
use crate::tracker::ChangeTracker;
use crate::viewport::{Viewport, ZoomDirection};

/// Quiet window before the dirty flag is rechecked.
pub const DIRTY_DEBOUNCE: Duration = Duration::from_millis(300);
/// Quiet window before reachability is recomputed.
pub const RECALC_DEBOUNCE: Duration = Duration::from_millis(250);

/// What the session announces to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The document changed (structurally or presentationally).
    PathChanged,
    /// The debounced reachability pass ran.
    ReachabilityRecomputed,
    DirtyStateChanged(bool),
    Saved { at_ms: u64 },
    /// The document was replaced by a known-good snapshot.
    PathRestored,
    SelectionChanged,
    ViewportChanged,
    /// A double-click asked for the node editor.
    NodeEditorRequested(NodeId),
}

pub struct EditorSession {
    path: LearningPath,
    viewport: Viewport,
    interaction: Interaction,
    tracker: ChangeTracker,
    dirty_check: Debounce,
    recalc: Debounce,
    enrichment: EnrichmentQueue,
    reachability: Reachability,
    store: Box<dyn PathStore>,
    observers: Vec<Box<dyn Fn(&EditorEvent)>>,
    torn_down: bool,
}

impl EditorSession {
    /// Wraps an existing document. The reachability pass runs once up
    /// front, so derived fields are valid before the first render.
    pub fn new(
        mut path: LearningPath,
        store: Box<dyn PathStore>,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Self {
        let reachability = Reachability::new(CompletionPolicy::default());
        reachability.annotate(&mut path);
        let tracker = ChangeTracker::new(&path);
        EditorSession {
            path,
            viewport: Viewport::new(canvas_width, canvas_height),
            interaction: Interaction::new(),
            tracker,
            dirty_check: Debounce::new(DIRTY_DEBOUNCE),
            recalc: Debounce::new(RECALC_DEBOUNCE),
            enrichment: EnrichmentQueue::new(),
            reachability,
            store,
            observers: Vec::new(),
            torn_down: false,
        }
    }

    /// Loads a stored path into a fresh session.
    pub fn open(
        id: &PathId,
        store: Box<dyn PathStore>,
        canvas_width: f32,
        canvas_height: f32,
    ) -> Result<Self, EditorError> {
        let path = store.load(id).map_err(EditorError::Load)?;
        Ok(EditorSession::new(path, store, canvas_width, canvas_height))
    }

    // -- observation --------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl Fn(&EditorEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&self, event: &EditorEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn path(&self) -> &LearningPath {
        &self.path
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        self.interaction.selection()
    }

    pub fn interaction_mode(&self) -> &InteractionMode {
        self.interaction.mode()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.tracker.has_unsaved_changes()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.interaction.set_view_mode(mode);
    }

    // -- document mutations -------------------------------------------------

    pub fn add_node(&mut self, kind: NodeKind, position: Position, now: Instant) -> Option<NodeId> {
        let id = self.path.add_node(kind, position);
        if id.is_some() {
            self.after_mutation(now);
        }
        id
    }

    pub fn add_activity_node(
        &mut self,
        descriptor: &ActivityDescriptor,
        position: Position,
        now: Instant,
    ) -> NodeId {
        let id = self.path.add_activity_node(descriptor, position);
        self.after_mutation(now);
        id
    }

    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch, now: Instant) -> bool {
        let changed = self.path.update_node(id, patch);
        if changed {
            self.after_mutation(now);
        }
        changed
    }

    pub fn delete_node(&mut self, id: &NodeId, now: Instant) -> bool {
        let deleted = self.path.delete_node(id);
        if deleted {
            if self.interaction.selection() == &Selection::Node(id.clone()) {
                let effects = self.interaction.key_escape();
                self.apply_effects(effects, now);
            }
            self.after_mutation(now);
        }
        deleted
    }

    pub fn connect_nodes(&mut self, from: &NodeId, to: &NodeId, now: Instant) -> bool {
        let connected = self.path.connect_nodes(from, to);
        if connected {
            self.after_mutation(now);
        }
        connected
    }

    pub fn delete_connection(&mut self, from: &NodeId, to: &NodeId, now: Instant) -> bool {
        let deleted = self.path.delete_connection(from, to);
        if deleted {
            self.after_mutation(now);
        }
        deleted
    }

    fn after_mutation(&mut self, now: Instant) {
        self.dirty_check.schedule(now);
        self.recalc.schedule(now);
        self.emit(&EditorEvent::PathChanged);
    }

    // -- pointer / keyboard -------------------------------------------------

    pub fn pointer_down_canvas(&mut self, x: f32, y: f32, now: Instant) {
        let effects = self.interaction.press_canvas(x, y);
        self.apply_effects(effects, now);
    }

    pub fn pointer_down_node(&mut self, id: &NodeId, x: f32, y: f32, modifier: bool, now: Instant) {
        let world = self.viewport.screen_to_world(x, y);
        let effects = self.interaction.press_node(&mut self.path, id, world, modifier);
        self.apply_effects(effects, now);
    }

    pub fn pointer_down_connector(&mut self, id: &NodeId, now: Instant) {
        let effects = self.interaction.press_connector(id);
        self.apply_effects(effects, now);
    }

    pub fn pointer_down_connection(&mut self, from: &NodeId, to: &NodeId, now: Instant) {
        let effects = self.interaction.press_connection(from, to);
        self.apply_effects(effects, now);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now: Instant) {
        let effects = self
            .interaction
            .pointer_move(&mut self.path, &mut self.viewport, x, y);
        self.apply_effects(effects, now);
    }

    pub fn pointer_up(&mut self) {
        self.interaction.release();
    }

    pub fn key_escape(&mut self, now: Instant) {
        let effects = self.interaction.key_escape();
        self.apply_effects(effects, now);
    }

    pub fn key_delete(&mut self, now: Instant) {
        let effects = self.interaction.key_delete(&mut self.path);
        self.apply_effects(effects, now);
    }

    pub fn double_click_node(&mut self, id: &NodeId, now: Instant) {
        let effects = self.interaction.double_click_node(&self.path, id);
        self.apply_effects(effects, now);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            match effect {
                Effect::PathChanged => self.after_mutation(now),
                Effect::SelectionChanged => self.emit(&EditorEvent::SelectionChanged),
                Effect::ViewportChanged => self.emit(&EditorEvent::ViewportChanged),
                Effect::EditRequested(id) => self.emit(&EditorEvent::NodeEditorRequested(id)),
            }
        }
    }

    // -- viewport -----------------------------------------------------------

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if self.viewport.pan_by(dx, dy) {
            self.emit(&EditorEvent::ViewportChanged);
        }
    }

    pub fn zoom_at(&mut self, cursor_x: f32, cursor_y: f32, direction: ZoomDirection) {
        if self.viewport.zoom_at(cursor_x, cursor_y, direction) {
            self.emit(&EditorEvent::ViewportChanged);
        }
    }

    pub fn fit_to_content(&mut self) {
        if self.viewport.fit_to_content(&self.path) {
            self.emit(&EditorEvent::ViewportChanged);
        }
    }

    // -- timers -------------------------------------------------------------

    /// Drives due timers. The rendering layer calls this from its frame
    /// loop (or a coarse interval); everything time-based in the session
    /// happens here.
    pub fn tick(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        if self.recalc.fire_due(now) {
            self.reachability.annotate(&mut self.path);
            self.emit(&EditorEvent::ReachabilityRecomputed);
        }
        if self.dirty_check.fire_due(now) {
            if let Some(dirty) = self.tracker.recheck(&self.path) {
                self.emit(&EditorEvent::DirtyStateChanged(dirty));
            }
        }
    }

    // -- persistence --------------------------------------------------------

    /// Saves a snapshot of the document. On success the dirty flag clears;
    /// on failure the document and flag are untouched and the error is
    /// returned, with no retry.
    pub fn save(&mut self, saved_at_ms: u64) -> Result<(), EditorError> {
        // Settle the flag so the post-save transition is announced exactly
        // once even if the debounce had not fired yet.
        if let Some(dirty) = self.tracker.recheck(&self.path) {
            self.emit(&EditorEvent::DirtyStateChanged(dirty));
        }
        let was_dirty = self.tracker.has_unsaved_changes();

        let id = PathId::from(&self.path);
        self.store
            .save(&id, &self.path, saved_at_ms)
            .map_err(EditorError::Save)?;

        self.tracker.mark_saved(&self.path);
        self.dirty_check.cancel();
        self.emit(&EditorEvent::Saved { at_ms: saved_at_ms });
        if was_dirty {
            self.emit(&EditorEvent::DirtyStateChanged(false));
        }
        Ok(())
    }

    /// Discards unsaved edits: the document reverts to the last known-good
    /// snapshot (the last save, or the initially supplied document).
    pub fn reset(&mut self) {
        self.restore(false);
    }

    /// Unconditional revert: like [`reset`](Self::reset), but also aborts
    /// any in-flight gesture and selection.
    pub fn force_restore(&mut self) {
        self.restore(true);
    }

    fn restore(&mut self, abort_interaction: bool) {
        let was_dirty = self.tracker.has_unsaved_changes()
            || self.tracker.recheck(&self.path).unwrap_or(false);

        self.path = self.tracker.baseline();
        self.tracker.mark_restored();
        self.reachability.annotate(&mut self.path);
        self.dirty_check.cancel();
        self.recalc.cancel();
        self.enrichment.invalidate_all();

        if abort_interaction {
            let view_mode = self.interaction.view_mode();
            self.interaction = Interaction::new();
            self.interaction.set_view_mode(view_mode);
        }

        self.emit(&EditorEvent::PathRestored);
        if was_dirty {
            self.emit(&EditorEvent::DirtyStateChanged(false));
        }
    }

    // -- enrichment ---------------------------------------------------------

    /// Issues an enrichment ticket for an activity node.
    pub fn request_enrichment(&self, id: &NodeId) -> Option<Ticket> {
        let node = self.path.node(id)?;
        self.enrichment.request(node)
    }

    /// Applies a resolved activity detail through its ticket. Stale tickets
    /// (teardown, restore, deleted node) are soft no-ops.
    pub fn apply_enrichment(&mut self, ticket: &Ticket, details: ActivityDetails) -> bool {
        if self.torn_down {
            return false;
        }
        let applied = self.enrichment.complete(ticket, details, &mut self.path);
        if applied {
            // Presentational only: renderers refresh, nothing gets dirty.
            self.emit(&EditorEvent::PathChanged);
        }
        applied
    }

    // -- lifecycle ----------------------------------------------------------

    /// Ends the session: cancels pending timers, invalidates enrichment
    /// tickets, and drops the observers. Every later call is inert.
    pub fn teardown(&mut self) {
        tracing::debug!(path = %self.path.id, "session teardown");
        self.dirty_check.cancel();
        self.recalc.cancel();
        self.enrichment.invalidate_all();
        self.observers.clear();
        self.torn_down = true;
    }
}
