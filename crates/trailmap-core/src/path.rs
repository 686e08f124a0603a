//! The learning-path document.
//!
//! [`LearningPath`] owns every node in an id-indexed arena
//! (`IndexMap<NodeId, Node>`, insertion-ordered) and is the single place
//! structural mutations happen. Mutation primitives return `bool` (did
//! anything change): structurally invalid requests -- self-loops, duplicate
//! edges, anchor deletion, unknown ids -- are silent no-ops that only emit a
//! `tracing::debug!` line.
//!
//! Every effective mutation bumps the `revision` counter and recomputes the
//! aggregate metrics (`total_duration`, `difficulty`). Dirty detection
//! elsewhere compares revisions instead of deep-comparing documents.
//!
//! The wire format serializes the arena as a JSON array of nodes; decoding
//! rejects duplicate ids and `sanitize` repairs everything else a malformed
//! snapshot can carry (dangling connections, missing anchors).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::ActivityDescriptor;
use crate::error::PathError;
use crate::id::NodeId;
use crate::node::{Node, NodeKind, NodePatch, Position, DIFFICULTY_RANGE};

/// Default canvas position for a synthesized start anchor.
const START_ANCHOR_POS: Position = Position { x: 150.0, y: 600.0 };

/// Default canvas position for a synthesized end anchor.
const END_ANCHOR_POS: Position = Position { x: 1850.0, y: 600.0 };

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A learning path: a directed graph of steps from a start anchor to an end
/// anchor, plus editorial metadata and derived aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "nodes_as_array")]
    nodes: IndexMap<NodeId, Node>,
    #[serde(default)]
    start_node_id: NodeId,
    #[serde(default)]
    end_node_id: NodeId,
    /// Derived: sum of node durations, minutes.
    #[serde(default)]
    pub total_duration: u32,
    /// Derived: rounded mean difficulty of the non-anchor nodes.
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Bumped on every effective mutation. Not part of the wire format.
    #[serde(skip)]
    revision: u64,
}

fn default_difficulty() -> u8 {
    1
}

impl LearningPath {
    /// Creates an empty path with fresh start/end anchors.
    pub fn new(name: impl Into<String>) -> Self {
        let start = Node::template(NodeKind::Start, START_ANCHOR_POS);
        let end = Node::template(NodeKind::End, END_ANCHOR_POS);
        let start_id = start.id.clone();
        let end_id = end.id.clone();

        let mut nodes = IndexMap::new();
        nodes.insert(start_id.clone(), start);
        nodes.insert(end_id.clone(), end);

        let mut path = LearningPath {
            id: NodeId::generate().0,
            name: name.into(),
            description: String::new(),
            nodes,
            start_node_id: start_id,
            end_node_id: end_id,
            total_duration: 0,
            difficulty: 1,
            tags: Vec::new(),
            revision: 0,
        };
        path.recompute_aggregates();
        path
    }

    // -- accessors ----------------------------------------------------------

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in arena (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn start_node_id(&self) -> &NodeId {
        &self.start_node_id
    }

    pub fn end_node_id(&self) -> &NodeId {
        &self.end_node_id
    }

    /// Current mutation revision. Equal revisions mean an unchanged document.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids of nodes with an out-edge to `id`, in arena order.
    pub fn predecessors(&self, id: &NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.connections.contains(id))
            .map(|(pred_id, _)| pred_id.clone())
            .collect()
    }

    // -- mutation primitives ------------------------------------------------

    /// Adds a built-in template node of the given kind.
    ///
    /// Returns `None` for `Activity` (activities come from the catalog via
    /// [`add_activity_node`](Self::add_activity_node)) and for anchor kinds,
    /// since the path already has its one start and one end.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> Option<NodeId> {
        if kind == NodeKind::Activity {
            tracing::debug!("add_node rejected: activity nodes require a catalog descriptor");
            return None;
        }
        if kind.is_anchor() {
            tracing::debug!(?kind, "add_node rejected: path already has its anchors");
            return None;
        }
        let node = Node::template(kind, position);
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.touch();
        Some(id)
    }

    /// Adds an activity node mapped 1:1 from a catalog descriptor.
    pub fn add_activity_node(&mut self, desc: &ActivityDescriptor, position: Position) -> NodeId {
        let node = Node::from_descriptor(desc, position);
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.touch();
        id
    }

    /// Applies a partial patch to a node. Returns `true` if anything changed.
    ///
    /// Anchor-protected fields (title, duration, reward on start/end) are
    /// ignored inside the patch; derived fields are not patchable at all.
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            tracing::debug!(%id, "update_node rejected: unknown node");
            return false;
        };
        let changed = node.apply_patch(patch);
        if changed {
            self.touch();
        }
        changed
    }

    /// Deletes a node and strips it from every other node's connections.
    /// No-op on the start/end anchors.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        match self.nodes.get(id) {
            None => {
                tracing::debug!(%id, "delete_node rejected: unknown node");
                return false;
            }
            Some(node) if node.is_anchor() => {
                tracing::debug!(%id, kind = ?node.kind, "delete_node rejected: anchor");
                return false;
            }
            Some(_) => {}
        }
        // shift_remove keeps arena order stable for the survivors.
        self.nodes.shift_remove(id);
        for node in self.nodes.values_mut() {
            node.connections.retain(|target| target != id);
        }
        self.touch();
        true
    }

    /// Adds a directed connection `from -> to`. No-op on self-loops,
    /// duplicates, and unknown endpoints.
    pub fn connect_nodes(&mut self, from: &NodeId, to: &NodeId) -> bool {
        if from == to {
            tracing::debug!(%from, "connect_nodes rejected: self-loop");
            return false;
        }
        if !self.nodes.contains_key(to) {
            tracing::debug!(%to, "connect_nodes rejected: unknown target");
            return false;
        }
        let Some(source) = self.nodes.get_mut(from) else {
            tracing::debug!(%from, "connect_nodes rejected: unknown source");
            return false;
        };
        if source.connections.contains(to) {
            tracing::debug!(%from, %to, "connect_nodes rejected: duplicate edge");
            return false;
        }
        source.connections.push(to.clone());
        self.touch();
        true
    }

    /// Removes the directed connection `from -> to` if present.
    pub fn delete_connection(&mut self, from: &NodeId, to: &NodeId) -> bool {
        let Some(source) = self.nodes.get_mut(from) else {
            tracing::debug!(%from, "delete_connection rejected: unknown source");
            return false;
        };
        let before = source.connections.len();
        source.connections.retain(|target| target != to);
        if source.connections.len() == before {
            tracing::debug!(%from, %to, "delete_connection rejected: no such edge");
            return false;
        }
        self.touch();
        true
    }

    /// Direct node access for the derived-state passes in `traverse`.
    /// Does NOT bump the revision: derived fields are not document changes.
    pub(crate) fn node_mut_untracked(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Writes the resolved activity detail onto a node. Returns `false` when
    /// the node is gone. The detail is a presentational cache, so this does
    /// not bump the revision or mark the document dirty.
    pub fn set_activity_details(
        &mut self,
        id: &NodeId,
        details: crate::node::ActivityDetails,
    ) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.metadata.activity_details = Some(details);
                true
            }
            None => {
                tracing::debug!(%id, "set_activity_details: node is gone");
                false
            }
        }
    }

    // -- aggregates and revision --------------------------------------------

    fn touch(&mut self) {
        self.revision += 1;
        self.recompute_aggregates();
        debug_assert!(self.check_consistency());
    }

    fn recompute_aggregates(&mut self) {
        self.total_duration = self.nodes.values().map(|n| n.duration).sum();
        let steps: Vec<u8> = self
            .nodes
            .values()
            .filter(|n| !n.is_anchor())
            .map(|n| n.difficulty)
            .collect();
        self.difficulty = if steps.is_empty() {
            1
        } else {
            let sum: u32 = steps.iter().map(|&d| u32::from(d)).sum();
            ((sum as f64 / steps.len() as f64).round() as u8).clamp(1, 5)
        };
    }

    /// Debug-build consistency check: every connection resolves, no
    /// self-loops, no duplicate edges, anchors designated and present.
    fn check_consistency(&self) -> bool {
        for (id, node) in &self.nodes {
            let mut seen: SmallVec<[&NodeId; 4]> = SmallVec::new();
            for target in &node.connections {
                if target == id || !self.nodes.contains_key(target) || seen.contains(&target) {
                    return false;
                }
                seen.push(target);
            }
        }
        self.nodes.contains_key(&self.start_node_id) && self.nodes.contains_key(&self.end_node_id)
    }

    // -- load / repair / validate -------------------------------------------

    /// Decodes a path document from JSON and repairs it via
    /// [`sanitize`](Self::sanitize).
    pub fn from_json(json: &str) -> Result<Self, PathError> {
        let mut path: LearningPath = serde_json::from_str(json)?;
        path.sanitize();
        Ok(path)
    }

    pub fn to_json(&self) -> Result<String, PathError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PathError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Repairs a document that arrived from outside:
    ///
    /// - strips dangling connections, self-loops, and duplicate edges,
    /// - clamps node difficulty back into its valid range,
    /// - re-designates the anchor ids from the node kinds when the recorded
    ///   ids do not resolve,
    /// - synthesizes missing start/end anchors with default templates,
    /// - recomputes the aggregates.
    ///
    /// Bumps the revision only when a repair actually changed something.
    pub fn sanitize(&mut self) {
        let mut repaired = false;

        let known: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for (id, node) in self.nodes.iter_mut() {
            let clamped = node
                .difficulty
                .clamp(DIFFICULTY_RANGE.0, DIFFICULTY_RANGE.1);
            if clamped != node.difficulty {
                tracing::debug!(%id, raw = node.difficulty, "sanitize: clamped difficulty");
                node.difficulty = clamped;
                repaired = true;
            }

            let before = node.connections.len();
            let mut seen: SmallVec<[NodeId; 4]> = SmallVec::new();
            node.connections.retain(|target| {
                let keep = target != id && known.contains(target) && !seen.contains(target);
                if keep {
                    seen.push(target.clone());
                }
                keep
            });
            if node.connections.len() != before {
                tracing::debug!(%id, "sanitize: stripped invalid connections");
                repaired = true;
            }
        }

        repaired |= self.ensure_anchor(NodeKind::Start);
        repaired |= self.ensure_anchor(NodeKind::End);

        if repaired {
            self.touch();
        } else {
            self.recompute_aggregates();
        }
    }

    /// Re-designates or synthesizes the anchor of the given kind. Returns
    /// `true` if the document changed.
    fn ensure_anchor(&mut self, kind: NodeKind) -> bool {
        let designated = match kind {
            NodeKind::Start => &self.start_node_id,
            _ => &self.end_node_id,
        };
        if self
            .nodes
            .get(designated)
            .is_some_and(|node| node.kind == kind)
        {
            return false;
        }

        // Prefer an existing node of the right kind over synthesizing one.
        let found = self
            .nodes
            .iter()
            .find(|(_, node)| node.kind == kind)
            .map(|(id, _)| id.clone());
        let id = match found {
            Some(id) => {
                tracing::debug!(%id, ?kind, "sanitize: re-designated anchor");
                id
            }
            None => {
                let pos = if kind == NodeKind::Start {
                    START_ANCHOR_POS
                } else {
                    END_ANCHOR_POS
                };
                let node = Node::template(kind, pos);
                let id = node.id.clone();
                tracing::debug!(%id, ?kind, "sanitize: synthesized missing anchor");
                self.nodes.insert(id.clone(), node);
                id
            }
        };
        match kind {
            NodeKind::Start => self.start_node_id = id,
            _ => self.end_node_id = id,
        }
        true
    }

    /// Strict structural validation, for callers that want malformed
    /// documents surfaced instead of repaired.
    pub fn validate(&self) -> Result<(), PathError> {
        for (id, node) in &self.nodes {
            for target in &node.connections {
                if !self.nodes.contains_key(target) {
                    return Err(PathError::DanglingConnection {
                        from: id.clone(),
                        to: target.clone(),
                    });
                }
            }
        }
        for kind in [NodeKind::Start, NodeKind::End] {
            let designated = match kind {
                NodeKind::Start => &self.start_node_id,
                _ => &self.end_node_id,
            };
            if !self
                .nodes
                .get(designated)
                .is_some_and(|node| node.kind == kind)
            {
                return Err(PathError::MissingAnchor { kind });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire format: nodes as an array
// ---------------------------------------------------------------------------

/// Serializes the node arena as a JSON array (the document wire format) and
/// rebuilds the id index on decode, rejecting duplicate ids.
mod nodes_as_array {
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::id::NodeId;
    use crate::node::Node;

    pub fn serialize<S>(nodes: &IndexMap<NodeId, Node>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(nodes.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<NodeId, Node>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Node>::deserialize(deserializer)?;
        let mut map = IndexMap::with_capacity(list.len());
        for node in list {
            let id = node.id.clone();
            if map.insert(id.clone(), node).is_some() {
                return Err(D::Error::custom(format!("duplicate node id: {id}")));
            }
        }
        Ok(map)
    }
}
