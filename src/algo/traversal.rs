//! Breadth-first shortest path and iterative depth-first traversal.
//!
//! Both walk out-edges only and read a single adjacency page per visited
//! node, so the branching factor per node is capped at the store's page
//! size. That cap is a scalability limit, not a correctness exception: a
//! node with more out-edges than one page holds is traversed partially.

use crate::graph::{Direction, GraphResult, GraphStore, NodeId};
use crate::kv::KvStore;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Default hop bound shared by both traversals
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Result of a shortest-path search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Hop count from source to target
    pub distance: usize,
    /// Visited ids, source first, target last
    pub path: Vec<NodeId>,
}

/// Hop-count BFS over out-edges.
///
/// Edge weight is not a cost: distance is the number of hops. Neighbors
/// expand in ascending-weight adjacency order and the first discovery of
/// `to` wins, so the result is deterministic but not necessarily the
/// minimum-total-weight path.
///
/// Nodes reached exactly at `max_depth` are recorded but not expanded, so a
/// target only reachable in `max_depth + 1` hops reports as no path.
/// `from == to` short-circuits to distance 0 regardless of graph contents.
pub fn shortest_path<S: KvStore>(
    store: &GraphStore<S>,
    from: NodeId,
    to: NodeId,
    max_depth: usize,
) -> GraphResult<Option<PathResult>> {
    if from == to {
        return Ok(Some(PathResult { distance: 0, path: vec![from] }));
    }

    let mut queue: VecDeque<(NodeId, usize, Vec<NodeId>)> = VecDeque::new();
    queue.push_back((from, 0, vec![from]));
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    seen.insert(from);

    while let Some((id, depth, path)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for (next, _weight) in store.neighbors_page(id, Direction::Out, 1)? {
            if next == to {
                let mut found = path;
                found.push(next);
                return Ok(Some(PathResult { distance: depth + 1, path: found }));
            }
            if seen.insert(next) {
                let mut extended = path.clone();
                extended.push(next);
                queue.push_back((next, depth + 1, extended));
            }
        }
    }
    Ok(None)
}

/// [`shortest_path`] with the default hop bound.
pub fn shortest_path_default<S: KvStore>(
    store: &GraphStore<S>,
    from: NodeId,
    to: NodeId,
) -> GraphResult<Option<PathResult>> {
    shortest_path(store, from, to, DEFAULT_MAX_DEPTH)
}

/// Iterative preorder DFS over out-edges; returns the full visit order,
/// `start` first.
///
/// Neighbors are pushed onto the stack in reverse adjacency order so the
/// walk yields the same left-to-right order a naive recursive walk would.
/// Nodes at `max_depth` are visited but their neighbors are not explored.
pub fn dfs<S: KvStore>(
    store: &GraphStore<S>,
    start: NodeId,
    max_depth: usize,
) -> GraphResult<Vec<NodeId>> {
    let mut stack = vec![(start, 0usize)];
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    seen.insert(start);
    let mut order = Vec::new();

    while let Some((id, depth)) = stack.pop() {
        order.push(id);
        if depth >= max_depth {
            continue;
        }
        let neighbors = store.neighbors_page(id, Direction::Out, 1)?;
        for (next, _weight) in neighbors.into_iter().rev() {
            if seen.insert(next) {
                stack.push((next, depth + 1));
            }
        }
    }
    Ok(order)
}

/// [`dfs`] with the default hop bound.
pub fn dfs_default<S: KvStore>(store: &GraphStore<S>, start: NodeId) -> GraphResult<Vec<NodeId>> {
    dfs(store, start, DEFAULT_MAX_DEPTH)
}
