//! Derived-state passes over a learning path.
//!
//! One BFS primitive ([`bfs_depths`]) feeds both consumers:
//!
//! - [`Reachability`] annotates the document in place (hop `order`,
//!   completion propagation, ordinal activity titles). It is the only code
//!   allowed to write the derived node fields, and it is idempotent.
//! - [`ordered_steps`] is a read-only flattened view: reachable nodes sorted
//!   ascending by hop distance, ties broken by arena order.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::node::{Node, NodeKind};
use crate::path::LearningPath;

/// How completion propagates into a node from its predecessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionPolicy {
    /// A node is completed when any in-edge predecessor is completed.
    /// This is the historical behavior and the default.
    #[default]
    AnyPredecessor,
    /// A node is completed only when every in-edge predecessor is completed.
    AllPredecessors,
}

/// Breadth-first hop distances from the start anchor.
///
/// Keys are the reachable node ids in BFS discovery order; the start maps to
/// 0. Unreachable nodes are absent. Neighbor expansion follows each node's
/// ordered connection list, so the discovery order is deterministic.
pub fn bfs_depths(path: &LearningPath) -> IndexMap<NodeId, u32> {
    let mut depths = IndexMap::new();
    let start = path.start_node_id().clone();
    if !path.contains(&start) {
        return depths;
    }

    depths.insert(start.clone(), 0);
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        let depth = depths[&id];
        let Some(node) = path.node(&id) else { continue };
        for target in &node.connections {
            if !depths.contains_key(target) && path.contains(target) {
                depths.insert(target.clone(), depth + 1);
                queue.push_back(target.clone());
            }
        }
    }
    depths
}

// ---------------------------------------------------------------------------
// Reachability annotation
// ---------------------------------------------------------------------------

/// The reachability pass: recomputes every derived node field from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reachability {
    policy: CompletionPolicy,
}

impl Reachability {
    pub fn new(policy: CompletionPolicy) -> Self {
        Reachability { policy }
    }

    /// Annotates the path in place.
    ///
    /// - `order` = BFS hop distance from the start (0 for the start itself
    ///   and for unreachable nodes).
    /// - `is_completed`: the start anchor is always completed; completion
    ///   then propagates level by level under the configured policy. End
    ///   anchors are never marked by propagation; unreachable nodes are
    ///   reset to not-completed.
    /// - Activity titles at `order > 0` gain a zero-padded `DDDD-` ordinal
    ///   prefix; an existing prefix is replaced, never stacked.
    ///
    /// Re-running on an unchanged path produces an identical result, and the
    /// document revision is untouched (derived fields are not edits).
    pub fn annotate(&self, path: &mut LearningPath) {
        let depths = bfs_depths(path);

        let ids: Vec<NodeId> = path.nodes().map(|n| n.id.clone()).collect();
        for id in &ids {
            if let Some(node) = path.node_mut_untracked(id) {
                node.order = depths.get(id).copied().unwrap_or(0);
                node.is_completed = false;
            }
        }

        let start = path.start_node_id().clone();
        if let Some(node) = path.node_mut_untracked(&start) {
            node.is_completed = true;
        }

        // Levels ascending; stable sort keeps BFS discovery order inside a
        // level.
        let mut levels: Vec<(u32, NodeId)> = depths
            .iter()
            .filter(|(_, depth)| **depth > 0)
            .map(|(id, depth)| (*depth, id.clone()))
            .collect();
        levels.sort_by_key(|(depth, _)| *depth);

        for (_, id) in &levels {
            if path.node(id).is_some_and(|n| n.kind == NodeKind::End) {
                continue;
            }
            let preds = path.predecessors(id);
            let done = |pred: &NodeId| path.node(pred).is_some_and(|n| n.is_completed);
            let completed = match self.policy {
                CompletionPolicy::AnyPredecessor => preds.iter().any(done),
                CompletionPolicy::AllPredecessors => {
                    !preds.is_empty() && preds.iter().all(done)
                }
            };
            if completed {
                if let Some(node) = path.node_mut_untracked(id) {
                    node.is_completed = true;
                }
            }
        }

        for (id, depth) in &depths {
            if *depth == 0 {
                continue;
            }
            if let Some(node) = path.node_mut_untracked(id) {
                if node.kind == NodeKind::Activity {
                    node.title = ordinal_title(&node.title, *depth);
                }
            }
        }
    }
}

/// Replaces or prepends the `DDDD-` ordinal prefix on an activity title.
fn ordinal_title(title: &str, order: u32) -> String {
    format!("{order:04}-{}", strip_ordinal_prefix(title))
}

fn strip_ordinal_prefix(title: &str) -> &str {
    let bytes = title.as_bytes();
    if bytes.len() >= 5
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
    {
        &title[5..]
    } else {
        title
    }
}

// ---------------------------------------------------------------------------
// Flattened order view
// ---------------------------------------------------------------------------

/// Reachable nodes sorted ascending by hop distance from the start, stable
/// on the arena's insertion order within a level. Read-only: never touches
/// the document.
pub fn ordered_steps(path: &LearningPath) -> Vec<&Node> {
    let depths = bfs_depths(path);
    let mut steps: Vec<(u32, &Node)> = path
        .nodes()
        .filter_map(|node| depths.get(&node.id).map(|&depth| (depth, node)))
        .collect();
    steps.sort_by_key(|(depth, _)| *depth);
    steps.into_iter().map(|(_, node)| node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Position;

    fn step(path: &mut LearningPath, title: &str) -> NodeId {
        let id = path
            .add_node(NodeKind::Milestone, Position::default())
            .unwrap();
        path.update_node(
            &id,
            &crate::node::NodePatch {
                title: Some(title.into()),
                ..Default::default()
            },
        );
        id
    }

    /// start -> a -> b -> end, with c dangling off to the side.
    fn chain() -> (LearningPath, NodeId, NodeId, NodeId) {
        let mut path = LearningPath::new("chain");
        let a = step(&mut path, "A");
        let b = step(&mut path, "B");
        let c = step(&mut path, "C");
        let start = path.start_node_id().clone();
        let end = path.end_node_id().clone();
        path.connect_nodes(&start, &a);
        path.connect_nodes(&a, &b);
        path.connect_nodes(&b, &end);
        (path, a, b, c)
    }

    #[test]
    fn bfs_depths_are_min_hop_counts() {
        let (path, a, b, c) = chain();
        let depths = bfs_depths(&path);

        assert_eq!(depths[path.start_node_id()], 0);
        assert_eq!(depths[&a], 1);
        assert_eq!(depths[&b], 2);
        assert_eq!(depths[path.end_node_id()], 3);
        assert!(!depths.contains_key(&c));
    }

    #[test]
    fn bfs_takes_the_shorter_of_two_routes() {
        let (mut path, a, b, _) = chain();
        let start = path.start_node_id().clone();
        // Shortcut straight to b.
        path.connect_nodes(&start, &b);

        let depths = bfs_depths(&path);
        assert_eq!(depths[&a], 1);
        assert_eq!(depths[&b], 1);
    }

    #[test]
    fn annotate_writes_order_and_completes_reachable_chain() {
        let (mut path, a, b, c) = chain();
        Reachability::default().annotate(&mut path);

        assert!(path.node(path.start_node_id()).unwrap().is_completed);
        assert_eq!(path.node(&a).unwrap().order, 1);
        assert!(path.node(&a).unwrap().is_completed);
        assert!(path.node(&b).unwrap().is_completed);
        // End gets an order but is never marked completed by propagation.
        assert_eq!(path.node(path.end_node_id()).unwrap().order, 3);
        assert!(!path.node(path.end_node_id()).unwrap().is_completed);
        // Unreachable: order 0, not completed.
        assert_eq!(path.node(&c).unwrap().order, 0);
        assert!(!path.node(&c).unwrap().is_completed);
    }

    #[test]
    fn any_predecessor_completes_diamond_merge() {
        let mut path = LearningPath::new("diamond");
        let left = step(&mut path, "L");
        let right = step(&mut path, "R");
        let merge = step(&mut path, "M");
        let start = path.start_node_id().clone();
        path.connect_nodes(&start, &left);
        path.connect_nodes(&left, &merge);
        path.connect_nodes(&right, &merge);

        Reachability::default().annotate(&mut path);
        // Right is unreachable, but the merge completes anyway: one
        // completed predecessor suffices.
        assert!(!path.node(&right).unwrap().is_completed);
        assert!(path.node(&merge).unwrap().is_completed);
    }

    #[test]
    fn all_predecessors_policy_blocks_the_merge() {
        let mut path = LearningPath::new("diamond");
        let left = step(&mut path, "L");
        let right = step(&mut path, "R");
        let merge = step(&mut path, "M");
        let start = path.start_node_id().clone();
        path.connect_nodes(&start, &left);
        path.connect_nodes(&left, &merge);
        path.connect_nodes(&right, &merge);

        Reachability::new(CompletionPolicy::AllPredecessors).annotate(&mut path);
        assert!(path.node(&left).unwrap().is_completed);
        assert!(!path.node(&merge).unwrap().is_completed);
    }

    #[test]
    fn annotate_is_idempotent() {
        let (mut path, ..) = chain();
        let pass = Reachability::default();

        pass.annotate(&mut path);
        let first = path.clone();
        pass.annotate(&mut path);
        assert_eq!(path, first);
    }

    #[test]
    fn annotate_does_not_bump_the_revision() {
        let (mut path, ..) = chain();
        let revision = path.revision();
        Reachability::default().annotate(&mut path);
        assert_eq!(path.revision(), revision);
    }

    #[test]
    fn activity_titles_get_ordinal_prefixes() {
        let mut path = LearningPath::new("p");
        let desc = crate::catalog::ActivityDescriptor {
            id: "act-1".into(),
            name: "Fire building".into(),
            ..Default::default()
        };
        let activity = path.add_activity_node(&desc, Position::default());
        let milestone = step(&mut path, "Checkpoint");
        let start = path.start_node_id().clone();
        path.connect_nodes(&start, &activity);
        path.connect_nodes(&activity, &milestone);

        let pass = Reachability::default();
        pass.annotate(&mut path);
        assert_eq!(path.node(&activity).unwrap().title, "0001-Fire building");
        // Non-activity titles are untouched.
        assert_eq!(path.node(&milestone).unwrap().title, "Checkpoint");

        // A second pass replaces the prefix instead of stacking another.
        pass.annotate(&mut path);
        assert_eq!(path.node(&activity).unwrap().title, "0001-Fire building");
    }

    #[test]
    fn ordinal_prefix_is_replaced_when_depth_changes() {
        assert_eq!(ordinal_title("0007-Knots", 2), "0002-Knots");
        assert_eq!(ordinal_title("Knots", 12), "0012-Knots");
        // A non-conforming prefix is kept as part of the title.
        assert_eq!(ordinal_title("12-Knots", 1), "0001-12-Knots");
    }

    #[test]
    fn ordered_steps_sorts_by_depth_stable_on_arena_order() {
        let (mut path, a, b, c) = chain();
        let start = path.start_node_id().clone();
        // d is inserted after c but shares a's depth; a must still come
        // first within the level.
        let d = step(&mut path, "D");
        path.connect_nodes(&start, &d);

        let order: Vec<&NodeId> = ordered_steps(&path).iter().map(|n| &n.id).collect();
        assert_eq!(
            order,
            vec![&start, &a, &d, &b, path.end_node_id()],
        );
        assert!(!order.contains(&&c));
    }
}
