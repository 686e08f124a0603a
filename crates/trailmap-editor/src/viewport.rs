//! Canvas viewport: pan, zoom, and fit-to-content math.
//!
//! The viewport maps world coordinates (node positions) to screen
//! coordinates: `screen = world * zoom + offset`. All the clamping rules
//! live here; the interaction layer only feeds in deltas and cursor
//! positions.

use trailmap_core::{LearningPath, Position};

/// Offset clamp per axis, screen units.
pub const PAN_LIMIT: f32 = 1000.0;

pub const ZOOM_MIN: f32 = 0.3;
pub const ZOOM_MAX: f32 = 3.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Fit never raises the zoom above this, no matter how tiny the content is.
const FIT_MAX_SCALE: f32 = 2.0;
/// Padding added around the content bounding box before the fit check.
const FIT_PADDING: f32 = 100.0;

/// One wheel detent, toward the cursor or away from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset_x: f32,
    offset_y: f32,
    zoom: f32,
    canvas_width: f32,
    canvas_height: f32,
}

impl Viewport {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Viewport {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    // -- coordinate mapping -------------------------------------------------

    pub fn world_to_screen(&self, world: Position) -> (f32, f32) {
        (
            world.x * self.zoom + self.offset_x,
            world.y * self.zoom + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Position {
        Position::new(
            (screen_x - self.offset_x) / self.zoom,
            (screen_y - self.offset_y) / self.zoom,
        )
    }

    // -- pan ----------------------------------------------------------------

    /// Pans by a screen-space delta, clamping the offset to
    /// `[-PAN_LIMIT, PAN_LIMIT]` per axis. Returns `true` if the offset
    /// moved.
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        let x = (self.offset_x + dx).clamp(-PAN_LIMIT, PAN_LIMIT);
        let y = (self.offset_y + dy).clamp(-PAN_LIMIT, PAN_LIMIT);
        let moved = x != self.offset_x || y != self.offset_y;
        self.offset_x = x;
        self.offset_y = y;
        moved
    }

    // -- zoom ---------------------------------------------------------------

    /// Applies one wheel detent anchored at the cursor: the world point
    /// under the cursor stays under the cursor. The zoom level clamps to
    /// `[ZOOM_MIN, ZOOM_MAX]`; at a limit the effective factor is 1 and the
    /// offset stops moving too. Returns `true` if anything changed.
    pub fn zoom_at(&mut self, cursor_x: f32, cursor_y: f32, direction: ZoomDirection) -> bool {
        let factor = match direction {
            ZoomDirection::In => ZOOM_IN_FACTOR,
            ZoomDirection::Out => ZOOM_OUT_FACTOR,
        };
        let new_zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        if new_zoom == self.zoom {
            return false;
        }
        let effective = new_zoom / self.zoom;
        self.offset_x = cursor_x - (cursor_x - self.offset_x) * effective;
        self.offset_y = cursor_y - (cursor_y - self.offset_y) * effective;
        self.zoom = new_zoom;
        true
    }

    // -- fit / center -------------------------------------------------------

    /// Centers the node bounding box on the canvas, reducing the zoom only
    /// when the padded box does not fit at the current level. The fit scale
    /// is capped at 2.0 and never increases the zoom. No-op on a path with
    /// no nodes.
    pub fn fit_to_content(&mut self, path: &LearningPath) -> bool {
        let mut positions = path.nodes().map(|n| n.position);
        let Some(first) = positions.next() else {
            return false;
        };
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        for p in positions {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let padded_w = (max_x - min_x) + 2.0 * FIT_PADDING;
        let padded_h = (max_y - min_y) + 2.0 * FIT_PADDING;
        let fits = padded_w * self.zoom <= self.canvas_width
            && padded_h * self.zoom <= self.canvas_height;
        if !fits {
            let scale = (self.canvas_width / padded_w)
                .min(self.canvas_height / padded_h)
                .min(FIT_MAX_SCALE);
            self.zoom = self.zoom.min(scale).clamp(ZOOM_MIN, ZOOM_MAX);
        }

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        let offset_x = self.canvas_width / 2.0 - center_x * self.zoom;
        let offset_y = self.canvas_height / 2.0 - center_y * self.zoom;
        let changed = offset_x != self.offset_x || offset_y != self.offset_y;
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        changed || !fits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmap_core::{NodeKind, NodePatch};

    fn vp() -> Viewport {
        Viewport::new(2000.0, 1200.0)
    }

    #[test]
    fn pan_clamps_each_axis_independently() {
        let mut v = vp();
        v.pan_by(5000.0, -30.0);
        assert_eq!(v.offset(), (PAN_LIMIT, -30.0));

        v.pan_by(0.0, -5000.0);
        assert_eq!(v.offset(), (PAN_LIMIT, -PAN_LIMIT));

        // Already at the limit: no movement reported.
        assert!(!v.pan_by(100.0, 0.0));
    }

    #[test]
    fn zoom_clamps_after_repeated_detents() {
        let mut v = vp();
        for _ in 0..20 {
            v.zoom_at(0.0, 0.0, ZoomDirection::In);
        }
        assert_eq!(v.zoom(), ZOOM_MAX);
        // At the ceiling a further detent is a no-op.
        assert!(!v.zoom_at(0.0, 0.0, ZoomDirection::In));

        for _ in 0..40 {
            v.zoom_at(0.0, 0.0, ZoomDirection::Out);
        }
        assert_eq!(v.zoom(), ZOOM_MIN);
    }

    #[test]
    fn zoom_keeps_the_cursor_point_fixed() {
        let mut v = vp();
        v.pan_by(120.0, -80.0);
        let world_before = v.screen_to_world(640.0, 360.0);

        v.zoom_at(640.0, 360.0, ZoomDirection::In);
        let world_after = v.screen_to_world(640.0, 360.0);

        assert!((world_before.x - world_after.x).abs() < 1e-3);
        assert!((world_before.y - world_after.y).abs() < 1e-3);
    }

    #[test]
    fn fit_centers_a_small_row_of_nodes_without_rezooming() {
        // Nodes at (0,0), (200,0), (400,0) on a 2000x1200 canvas: the
        // padded box fits at zoom 1, so only the offset moves.
        let mut path = LearningPath::new("row");
        for i in 0..3 {
            path.add_node(NodeKind::Milestone, Position::new(i as f32 * 200.0, 0.0))
                .unwrap();
        }
        let start = path.start_node_id().clone();
        let end = path.end_node_id().clone();
        path.update_node(&start, &NodePatch::move_to(Position::new(0.0, 0.0)));
        path.update_node(&end, &NodePatch::move_to(Position::new(400.0, 0.0)));

        let mut v = vp();
        v.fit_to_content(&path);
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.offset(), (800.0, 600.0));
    }

    #[test]
    fn fit_only_ever_reduces_zoom() {
        let mut path = LearningPath::new("wide");
        path.add_node(NodeKind::Milestone, Position::new(0.0, 0.0))
            .unwrap();
        path.add_node(NodeKind::Milestone, Position::new(4000.0, 0.0))
            .unwrap();
        let start = path.start_node_id().clone();
        let end = path.end_node_id().clone();
        path.update_node(&start, &NodePatch::move_to(Position::new(0.0, 0.0)));
        path.update_node(&end, &NodePatch::move_to(Position::new(0.0, 0.0)));

        let mut v = vp();
        v.fit_to_content(&path);
        // 4200 padded width into a 2000 canvas.
        assert!(v.zoom() < 0.5);

        // Tiny content never zooms back in.
        let small = LearningPath::new("small");
        let zoom_before = v.zoom();
        v.fit_to_content(&small);
        assert!(v.zoom() <= zoom_before);
    }
}
