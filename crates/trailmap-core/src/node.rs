//! Node types for the learning-path graph.
//!
//! A [`Node`] is one step in a path: the start/end anchors, an activity
//! pulled from the external catalog, a milestone, or a break. Nodes carry
//! their own ordered out-edge list (`connections`), editorial fields, and
//! two derived fields (`order`, `is_completed`) that only the reachability
//! pass writes.
//!
//! Serialization follows the path document wire format: camelCase keys and
//! the node kind under a `type` tag.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::ActivityDescriptor;
use crate::id::NodeId;

/// Default duration (minutes) for template nodes and catalog activities
/// that do not specify one.
pub const DEFAULT_DURATION: u32 = 30;

/// Default difficulty for template nodes and catalog activities that do not
/// specify one.
pub const DEFAULT_DIFFICULTY: u8 = 1;

/// Difficulty range for any node.
pub const DIFFICULTY_RANGE: (u8, u8) = (1, 5);

// ---------------------------------------------------------------------------
// Node kind
// ---------------------------------------------------------------------------

/// The kind of a path node.
///
/// `Start` and `End` are the entry/exit anchors: exactly one of each is
/// designated per path, they cannot be deleted, and their title, duration,
/// and reward are read-only from the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    End,
    Activity,
    Milestone,
    Break,
}

impl NodeKind {
    /// Returns `true` for the start/end anchor kinds.
    pub fn is_anchor(&self) -> bool {
        matches!(self, NodeKind::Start | NodeKind::End)
    }

    /// Default display title for template nodes of this kind.
    pub fn template_title(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "Finish",
            NodeKind::Activity => "Activity",
            NodeKind::Milestone => "Milestone",
            NodeKind::Break => "Break",
        }
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// World-space canvas position of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }
}

// ---------------------------------------------------------------------------
// Activity metadata
// ---------------------------------------------------------------------------

/// Descriptive detail for an activity node, resolved lazily from the
/// external catalog. Purely presentational: rendering falls back to the raw
/// node fields when this is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    /// Catalog id the detail was resolved from.
    pub activity_id: String,
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

impl From<&ActivityDescriptor> for ActivityDetails {
    fn from(desc: &ActivityDescriptor) -> Self {
        ActivityDetails {
            activity_id: desc.id.clone(),
            name: desc.name.clone(),
            description: desc.description.clone(),
            activity_type: desc.activity_type.clone(),
            difficulty_level: desc.difficulty_level,
            duration_minutes: desc.duration_minutes,
            materials: desc.materials.clone(),
            instructions: desc.instructions.clone(),
        }
    }
}

/// Per-node metadata bag.
///
/// `activity_details` is the only field written from outside the editing
/// flow (by the detached enrichment cycle); everything else is set when the
/// node is created or patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    /// Catalog id for activity nodes created from a descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_details: Option<ActivityDetails>,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single step in a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default = "default_duration_unit")]
    pub duration_unit: String,
    /// Difficulty in `[1, 5]`.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    /// Informational prerequisite labels; not graph edges.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub reward: String,
    pub position: Position,
    /// Ordered, directed out-edges (node ids).
    #[serde(default)]
    pub connections: SmallVec<[NodeId; 4]>,
    /// Derived: written by the reachability pass only.
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_locked: bool,
    /// Derived: BFS hop distance from the start anchor.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

fn default_duration_unit() -> String {
    "minutes".to_string()
}

fn default_difficulty() -> u8 {
    DEFAULT_DIFFICULTY
}

impl Node {
    /// Creates a built-in template node of the given kind.
    ///
    /// Anchors get a zero duration (their duration is read-only anyway);
    /// milestone/break templates get the 30-minute default.
    pub fn template(kind: NodeKind, position: Position) -> Self {
        let duration = if kind.is_anchor() { 0 } else { DEFAULT_DURATION };
        Node {
            id: NodeId::generate(),
            kind,
            title: kind.template_title().to_string(),
            description: String::new(),
            duration,
            duration_unit: default_duration_unit(),
            difficulty: DEFAULT_DIFFICULTY,
            prerequisites: Vec::new(),
            reward: String::new(),
            position,
            connections: SmallVec::new(),
            is_completed: false,
            is_locked: false,
            order: 0,
            metadata: NodeMetadata::default(),
        }
    }

    /// Creates an activity node from a catalog descriptor (1:1 mapping).
    ///
    /// Missing descriptor fields fall back to the template defaults:
    /// duration 30, difficulty 1.
    pub fn from_descriptor(desc: &ActivityDescriptor, position: Position) -> Self {
        let difficulty = desc
            .difficulty_level
            .unwrap_or(DEFAULT_DIFFICULTY)
            .clamp(DIFFICULTY_RANGE.0, DIFFICULTY_RANGE.1);
        Node {
            id: NodeId::generate(),
            kind: NodeKind::Activity,
            title: desc.name.clone(),
            description: desc.description.clone(),
            duration: desc.duration_minutes.unwrap_or(DEFAULT_DURATION),
            duration_unit: default_duration_unit(),
            difficulty,
            prerequisites: Vec::new(),
            reward: String::new(),
            position,
            connections: SmallVec::new(),
            is_completed: false,
            is_locked: false,
            order: 0,
            metadata: NodeMetadata {
                activity_type: Some(desc.activity_type.clone()),
                materials: desc.materials.clone(),
                instructions: desc.instructions.clone(),
                learning_objectives: Vec::new(),
                activity_id: Some(desc.id.clone()),
                activity_details: None,
            },
        }
    }

    /// Returns `true` if this node is a start/end anchor.
    pub fn is_anchor(&self) -> bool {
        self.kind.is_anchor()
    }

    /// Applies a partial patch to this node, returning `true` if any field
    /// changed.
    ///
    /// Anchor protection: on start/end nodes the title, duration, and reward
    /// fields of the patch are ignored. Derived fields (`order`,
    /// `is_completed`) are not patchable at all -- [`NodePatch`] has no such
    /// fields.
    pub fn apply_patch(&mut self, patch: &NodePatch) -> bool {
        let anchor = self.is_anchor();
        let mut changed = false;

        if !anchor {
            if let Some(title) = &patch.title {
                changed |= assign(&mut self.title, title.clone());
            }
            if let Some(duration) = patch.duration {
                changed |= assign(&mut self.duration, duration);
            }
            if let Some(reward) = &patch.reward {
                changed |= assign(&mut self.reward, reward.clone());
            }
        }
        if let Some(description) = &patch.description {
            changed |= assign(&mut self.description, description.clone());
        }
        if let Some(duration_unit) = &patch.duration_unit {
            changed |= assign(&mut self.duration_unit, duration_unit.clone());
        }
        if let Some(difficulty) = patch.difficulty {
            let clamped = difficulty.clamp(DIFFICULTY_RANGE.0, DIFFICULTY_RANGE.1);
            changed |= assign(&mut self.difficulty, clamped);
        }
        if let Some(prerequisites) = &patch.prerequisites {
            changed |= assign(&mut self.prerequisites, prerequisites.clone());
        }
        if let Some(position) = patch.position {
            if self.position != position {
                self.position = position;
                changed = true;
            }
        }
        if let Some(is_locked) = patch.is_locked {
            changed |= assign(&mut self.is_locked, is_locked);
        }
        if let Some(metadata) = &patch.metadata {
            changed |= metadata.apply(&mut self.metadata);
        }

        changed
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// A partial node update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataPatch>,
}

impl NodePatch {
    /// Convenience: a patch that only moves the node.
    pub fn move_to(position: Position) -> Self {
        NodePatch {
            position: Some(position),
            ..NodePatch::default()
        }
    }
}

/// Partial update of the metadata bag. `activity_details` is deliberately
/// absent: it is only written by the enrichment cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
}

impl MetadataPatch {
    fn apply(&self, target: &mut NodeMetadata) -> bool {
        let mut changed = false;
        if let Some(activity_type) = &self.activity_type {
            changed |= assign(&mut target.activity_type, Some(activity_type.clone()));
        }
        if let Some(materials) = &self.materials {
            changed |= assign(&mut target.materials, materials.clone());
        }
        if let Some(instructions) = &self.instructions {
            changed |= assign(&mut target.instructions, instructions.clone());
        }
        if let Some(objectives) = &self.learning_objectives {
            changed |= assign(&mut target.learning_objectives, objectives.clone());
        }
        if let Some(activity_id) = &self.activity_id {
            changed |= assign(&mut target.activity_id, Some(activity_id.clone()));
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ActivityDescriptor {
        ActivityDescriptor {
            id: "act-9".into(),
            name: "Knot tying".into(),
            description: "Learn three basic knots".into(),
            activity_type: "outdoor".into(),
            difficulty_level: Some(3),
            duration_minutes: Some(45),
            materials: vec!["rope".into()],
            instructions: "Follow the rope card".into(),
        }
    }

    #[test]
    fn template_anchor_has_zero_duration() {
        let start = Node::template(NodeKind::Start, Position::new(100.0, 100.0));
        assert_eq!(start.duration, 0);
        assert!(start.is_anchor());
        assert_eq!(start.title, "Start");
    }

    #[test]
    fn template_milestone_uses_defaults() {
        let node = Node::template(NodeKind::Milestone, Position::default());
        assert_eq!(node.duration, DEFAULT_DURATION);
        assert_eq!(node.difficulty, DEFAULT_DIFFICULTY);
        assert!(!node.is_anchor());
    }

    #[test]
    fn from_descriptor_maps_fields_one_to_one() {
        let node = Node::from_descriptor(&descriptor(), Position::new(200.0, 300.0));
        assert_eq!(node.kind, NodeKind::Activity);
        assert_eq!(node.title, "Knot tying");
        assert_eq!(node.duration, 45);
        assert_eq!(node.difficulty, 3);
        assert_eq!(node.metadata.activity_id.as_deref(), Some("act-9"));
        assert_eq!(node.metadata.activity_type.as_deref(), Some("outdoor"));
        assert_eq!(node.metadata.materials, vec!["rope".to_string()]);
    }

    #[test]
    fn from_descriptor_defaults_missing_duration_and_difficulty() {
        let mut desc = descriptor();
        desc.duration_minutes = None;
        desc.difficulty_level = None;

        let node = Node::from_descriptor(&desc, Position::default());
        assert_eq!(node.duration, DEFAULT_DURATION);
        assert_eq!(node.difficulty, DEFAULT_DIFFICULTY);
    }

    #[test]
    fn patch_updates_fields_and_reports_change() {
        let mut node = Node::template(NodeKind::Break, Position::default());
        let patch = NodePatch {
            title: Some("Lunch".into()),
            duration: Some(60),
            ..NodePatch::default()
        };

        assert!(node.apply_patch(&patch));
        assert_eq!(node.title, "Lunch");
        assert_eq!(node.duration, 60);

        // Re-applying the identical patch changes nothing.
        assert!(!node.apply_patch(&patch));
    }

    #[test]
    fn patch_on_anchor_ignores_protected_fields() {
        let mut node = Node::template(NodeKind::Start, Position::default());
        let patch = NodePatch {
            title: Some("Renamed".into()),
            duration: Some(90),
            reward: Some("gold star".into()),
            description: Some("entry point".into()),
            ..NodePatch::default()
        };

        assert!(node.apply_patch(&patch));
        assert_eq!(node.title, "Start");
        assert_eq!(node.duration, 0);
        assert_eq!(node.reward, "");
        // Unprotected fields still apply.
        assert_eq!(node.description, "entry point");
    }

    #[test]
    fn patch_clamps_difficulty() {
        let mut node = Node::template(NodeKind::Milestone, Position::default());
        node.apply_patch(&NodePatch {
            difficulty: Some(9),
            ..NodePatch::default()
        });
        assert_eq!(node.difficulty, 5);

        node.apply_patch(&NodePatch {
            difficulty: Some(0),
            ..NodePatch::default()
        });
        assert_eq!(node.difficulty, 1);
    }

    #[test]
    fn serde_uses_wire_format_keys() {
        let node = Node::template(NodeKind::Milestone, Position::new(10.0, 20.0));
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["type"], "milestone");
        assert!(value.get("durationUnit").is_some());
        assert!(value.get("isCompleted").is_some());
        assert!(value.get("isLocked").is_some());
        assert!(value.get("connections").unwrap().is_array());
    }

    #[test]
    fn serde_roundtrip_activity_node() {
        let mut node = Node::from_descriptor(&descriptor(), Position::new(5.0, 6.0));
        node.metadata.activity_details = Some(ActivityDetails::from(&descriptor()));

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
