//! Canvas interaction state machine.
//!
//! One pointer interaction is active at a time: panning the canvas,
//! dragging a node, or connecting two nodes. The machine owns the selection
//! too, and gates every mutating gesture on [`ViewMode::Edit`] -- preview
//! sessions can select and inspect but never change the document.
//!
//! Methods mutate the document/viewport directly (structurally invalid
//! requests fall through to the model's silent no-ops) and return the
//! [`Effect`]s the session should announce to its observers.

use trailmap_core::{LearningPath, NodeId, NodePatch, Position};

use crate::viewport::Viewport;

/// World-space bounds a dragged node is clamped to.
const NODE_X_RANGE: (f32, f32) = (50.0, 1950.0);
const NODE_Y_RANGE: (f32, f32) = (50.0, 1150.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Edit,
    /// Read-only: selection works, every mutating gesture is ignored.
    Preview,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Idle,
    CanvasPanning {
        last: (f32, f32),
    },
    NodeDragging {
        node: NodeId,
        /// World-space offset from the node origin to the grab point, so
        /// the node does not jump under the cursor.
        grab: (f32, f32),
    },
    Connecting {
        source: NodeId,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Connection {
        from: NodeId,
        to: NodeId,
    },
}

/// What a gesture changed; the session maps these onto observer events.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PathChanged,
    SelectionChanged,
    ViewportChanged,
    EditRequested(NodeId),
}

#[derive(Debug, Default)]
pub struct Interaction {
    mode: InteractionMode,
    view_mode: ViewMode,
    selection: Selection,
}

impl Interaction {
    pub fn new() -> Self {
        Interaction::default()
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Switching into preview aborts whatever gesture was in flight.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if mode == ViewMode::Preview && self.mode != InteractionMode::Idle {
            tracing::debug!("preview mode: aborting active gesture");
            self.mode = InteractionMode::Idle;
        }
        self.view_mode = mode;
    }

    fn editable(&self) -> bool {
        self.view_mode == ViewMode::Edit
    }

    fn select(&mut self, selection: Selection) -> Option<Effect> {
        if self.selection != selection {
            self.selection = selection;
            Some(Effect::SelectionChanged)
        } else {
            None
        }
    }

    // -- pointer down -------------------------------------------------------

    /// Press on empty canvas: cancels an in-flight connect, clears the
    /// selection, and (in edit mode) starts panning.
    pub fn press_canvas(&mut self, x: f32, y: f32) -> Vec<Effect> {
        let mut effects = Vec::new();
        if matches!(self.mode, InteractionMode::Connecting { .. }) {
            self.mode = InteractionMode::Idle;
        }
        effects.extend(self.select(Selection::None));
        if self.editable() {
            self.mode = InteractionMode::CanvasPanning { last: (x, y) };
        }
        effects
    }

    /// Press on a node body. Completes an in-flight connect, otherwise
    /// selects the node and (in edit mode) starts dragging it. A
    /// modifier-click in edit mode starts connecting from the node instead.
    pub fn press_node(
        &mut self,
        path: &mut LearningPath,
        id: &NodeId,
        world: Position,
        modifier: bool,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let InteractionMode::Connecting { source } = self.mode.clone() {
            self.mode = InteractionMode::Idle;
            if path.connect_nodes(&source, id) {
                effects.push(Effect::PathChanged);
            }
            effects.extend(self.select(Selection::Node(id.clone())));
            return effects;
        }

        if self.editable() && modifier {
            self.mode = InteractionMode::Connecting { source: id.clone() };
            return effects;
        }

        effects.extend(self.select(Selection::Node(id.clone())));
        if self.editable() {
            if let Some(node) = path.node(id) {
                self.mode = InteractionMode::NodeDragging {
                    node: id.clone(),
                    grab: (world.x - node.position.x, world.y - node.position.y),
                };
            }
        }
        effects
    }

    /// Press on a node's connector handle: starts connecting (edit mode
    /// only).
    pub fn press_connector(&mut self, id: &NodeId) -> Vec<Effect> {
        if self.editable() {
            self.mode = InteractionMode::Connecting { source: id.clone() };
        }
        Vec::new()
    }

    /// Press on a rendered connection: selects it.
    pub fn press_connection(&mut self, from: &NodeId, to: &NodeId) -> Vec<Effect> {
        self.select(Selection::Connection {
            from: from.clone(),
            to: to.clone(),
        })
        .into_iter()
        .collect()
    }

    // -- pointer move / up --------------------------------------------------

    /// Pointer move in screen coordinates. Pans or drags depending on the
    /// active mode.
    pub fn pointer_move(
        &mut self,
        path: &mut LearningPath,
        viewport: &mut Viewport,
        x: f32,
        y: f32,
    ) -> Vec<Effect> {
        match &mut self.mode {
            InteractionMode::CanvasPanning { last } => {
                let (dx, dy) = (x - last.0, y - last.1);
                *last = (x, y);
                if viewport.pan_by(dx, dy) {
                    vec![Effect::ViewportChanged]
                } else {
                    Vec::new()
                }
            }
            InteractionMode::NodeDragging { node, grab } => {
                let node = node.clone();
                let grab = *grab;
                let world = viewport.screen_to_world(x, y);
                let target = Position::new(
                    (world.x - grab.0).clamp(NODE_X_RANGE.0, NODE_X_RANGE.1),
                    (world.y - grab.1).clamp(NODE_Y_RANGE.0, NODE_Y_RANGE.1),
                );
                if path.update_node(&node, &NodePatch::move_to(target)) {
                    vec![Effect::PathChanged]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Pointer up ends panning and dragging. Connecting stays armed until a
    /// target press or Escape.
    pub fn release(&mut self) {
        if matches!(
            self.mode,
            InteractionMode::CanvasPanning { .. } | InteractionMode::NodeDragging { .. }
        ) {
            self.mode = InteractionMode::Idle;
        }
    }

    // -- keyboard -----------------------------------------------------------

    /// Escape aborts the active gesture and clears the selection.
    pub fn key_escape(&mut self) -> Vec<Effect> {
        self.mode = InteractionMode::Idle;
        self.select(Selection::None).into_iter().collect()
    }

    /// Delete removes the selected connection (edit mode only). A selected
    /// node is untouched; node deletion goes through the node editor.
    pub fn key_delete(&mut self, path: &mut LearningPath) -> Vec<Effect> {
        if !self.editable() {
            return Vec::new();
        }
        let Selection::Connection { from, to } = self.selection.clone() else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if path.delete_connection(&from, &to) {
            effects.push(Effect::PathChanged);
        }
        effects.extend(self.select(Selection::None));
        effects
    }

    // -- double click -------------------------------------------------------

    /// Double-click opens the node editor, except on anchors and in
    /// preview mode.
    pub fn double_click_node(&mut self, path: &LearningPath, id: &NodeId) -> Vec<Effect> {
        if !self.editable() {
            return Vec::new();
        }
        match path.node(id) {
            Some(node) if !node.is_anchor() => vec![Effect::EditRequested(id.clone())],
            _ => Vec::new(),
        }
    }
}
