//! Breadth-first shortest paths over an [`InteractionGraph`].
//!
//! Edges are unweighted, so the first time a node is dequeued its distance
//! is minimal. No state is kept between calls.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::NodeIndex;

use super::index::InteractionGraph;

/// Outcome of a hop-distance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLength {
    /// Number of edges on a shortest path. Zero only when start equals end.
    Found(usize),
    /// No path, including when either endpoint is absent from the graph.
    Unreachable,
}

impl PathLength {
    /// The hop count, if a path exists.
    pub fn hops(self) -> Option<usize> {
        match self {
            PathLength::Found(hops) => Some(hops),
            PathLength::Unreachable => None,
        }
    }

    pub fn is_reachable(self) -> bool {
        matches!(self, PathLength::Found(_))
    }
}

/// Hop distance from `start_id` to `end_id`.
///
/// Identical identifiers are distance 0 even when neither is in the graph.
pub fn shortest_path(graph: &InteractionGraph, start_id: &str, end_id: &str) -> PathLength {
    if start_id == end_id {
        return PathLength::Found(0);
    }
    let (Some(start), Some(end)) = (graph.node(start_id), graph.node(end_id)) else {
        return PathLength::Unreachable;
    };

    let arena = graph.arena();
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    // BFS queue: (node, distance from start)
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((node, distance)) = queue.pop_front() {
        if node == end {
            return PathLength::Found(distance);
        }
        if !visited.insert(node) {
            continue;
        }
        for next in arena.neighbors_directed(node, Direction::Outgoing) {
            if !visited.contains(&next) {
                queue.push_back((next, distance + 1));
            }
        }
    }

    tracing::trace!(start_id, end_id, visited = visited.len(), "no path");
    PathLength::Unreachable
}

/// Identifiers along one shortest path from `start_id` to `end_id`, both inclusive.
///
/// Returns `None` if no path exists.
pub fn shortest_route(
    graph: &InteractionGraph,
    start_id: &str,
    end_id: &str,
) -> Option<Vec<String>> {
    if start_id == end_id {
        return Some(vec![start_id.to_string()]);
    }
    let start = graph.node(start_id)?;
    let end = graph.node(end_id)?;

    let arena = graph.arena();
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    parent.insert(start, start);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        if node == end {
            let mut route = vec![arena[end].id.clone()];
            let mut cursor = end;
            while cursor != start {
                cursor = parent[&cursor];
                route.push(arena[cursor].id.clone());
            }
            route.reverse();
            return Some(route);
        }
        for next in arena.neighbors_directed(node, Direction::Outgoing) {
            if let std::collections::hash_map::Entry::Vacant(slot) = parent.entry(next) {
                slot.insert(node);
                queue.push_back(next);
            }
        }
    }
    None
}
