//! Graph storage over the key-value contract.
//!
//! Every node and edge is encoded as counter / field-map / ordered-set
//! records:
//!
//! | key                     | type        | content                       |
//! |-------------------------|-------------|-------------------------------|
//! | `global:node_id`        | counter     | last assigned node id         |
//! | `node:{id}`             | field map   | node property map             |
//! | `edge:{id}:out`         | ordered set | out-neighbors, score = weight |
//! | `edge:{id}:in`          | ordered set | in-neighbors, score = weight  |
//! | `edge_prop:{from}:{to}` | field map   | edge property map             |
//!
//! The two adjacency sets are the only index; every traversal and the
//! interchange serializer read through them.

use super::property::PropertyMap;
use super::types::{Direction, NodeId};
use crate::kv::{Batch, KvError, KvStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Counter key holding the last assigned node id
const NODE_COUNTER_KEY: &str = "global:node_id";

/// Default page size for neighbor listings
pub const DEFAULT_PAGE_SIZE: usize = 100;

fn node_key(id: u64) -> String {
    format!("node:{}", id)
}

fn adjacency_key(id: u64, direction: Direction) -> String {
    format!("edge:{}:{}", id, direction.as_str())
}

fn edge_prop_key(from: u64, to: u64) -> String {
    format!("edge_prop:{}:{}", from, to)
}

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("store error: {0}")]
    Store(#[from] KvError),

    #[error("page and page_size must both be at least 1")]
    InvalidPage,
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Live node and edge counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: u64,
    pub edges: u64,
}

/// Directed, weighted, property-labeled graph over a key-value store.
///
/// All calls are synchronous and blocking. The only atomicity unit is the
/// store's batched commit, used for [`del_node`](GraphStore::del_node),
/// [`add_edge`](GraphStore::add_edge) and
/// [`del_edge`](GraphStore::del_edge); it guarantees all-or-nothing
/// execution but no isolation from concurrent callers.
pub struct GraphStore<S: KvStore> {
    kv: S,
    page_size: usize,
}

impl<S: KvStore> GraphStore<S> {
    /// Create a graph store over `kv` with the default neighbor page size.
    pub fn new(kv: S) -> Self {
        GraphStore { kv, page_size: DEFAULT_PAGE_SIZE }
    }

    /// Create a graph store with a custom neighbor page size.
    pub fn with_page_size(kv: S, page_size: usize) -> Self {
        GraphStore { kv, page_size }
    }

    /// Default page size used by [`neighbors_page`](GraphStore::neighbors_page)
    /// and the traversal algorithms.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /* ---------- nodes ---------- */

    /// Create a node and return its freshly assigned id.
    ///
    /// Ids come from the store counter: strictly increasing, never reused,
    /// not even after deletion. An empty property map still creates the node
    /// record; node existence is keyed on the presence of the map.
    pub fn add_node(&mut self, properties: PropertyMap) -> GraphResult<NodeId> {
        let id = self.kv.counter_next(NODE_COUNTER_KEY)?;
        self.kv.hash_set(&node_key(id), properties)?;
        Ok(NodeId::new(id))
    }

    /// Property map of a node, or `None` if it was never created or was
    /// deleted.
    pub fn get_node(&self, id: NodeId) -> GraphResult<Option<PropertyMap>> {
        Ok(self.kv.hash_get_all(&node_key(id.as_u64()))?)
    }

    /// Merge `diff` into the node's properties, last write wins per key.
    /// An empty `diff` is a no-op.
    ///
    /// Existence is not checked: updating a missing id writes an orphan
    /// property record (upsert).
    pub fn update_node(&mut self, id: NodeId, diff: PropertyMap) -> GraphResult<()> {
        if diff.is_empty() {
            return Ok(());
        }
        self.kv.hash_set(&node_key(id.as_u64()), diff)?;
        Ok(())
    }

    /// Delete a node together with every incident edge, in both directions.
    ///
    /// The adjacency lists are snapshotted with an unguarded read before the
    /// atomic batch; a concurrent `add_edge` landing in between can leave a
    /// dangling entry. Deleting a nonexistent node is a no-op.
    pub fn del_node(&mut self, id: NodeId) -> GraphResult<()> {
        let id = id.as_u64();
        let out = self.kv.sorted_range(&adjacency_key(id, Direction::Out), 0, -1)?;
        let incoming = self.kv.sorted_range(&adjacency_key(id, Direction::In), 0, -1)?;
        debug!(node = id, out = out.len(), incoming = incoming.len(), "cascading node delete");

        let mut batch = Batch::new();
        for (to, _) in &out {
            batch.delete(edge_prop_key(id, *to));
            batch.sorted_remove(adjacency_key(*to, Direction::In), id);
        }
        for (from, _) in &incoming {
            batch.delete(edge_prop_key(*from, id));
            batch.sorted_remove(adjacency_key(*from, Direction::Out), id);
        }
        batch.delete(adjacency_key(id, Direction::Out));
        batch.delete(adjacency_key(id, Direction::In));
        batch.delete(node_key(id));
        self.kv.commit(batch)?;
        Ok(())
    }

    /// Existence probe, no side effects.
    pub fn node_exists(&self, id: NodeId) -> GraphResult<bool> {
        Ok(self.kv.hash_get_all(&node_key(id.as_u64()))?.is_some())
    }

    /* ---------- edges ---------- */

    /// Add or update the directed edge `from -> to`.
    ///
    /// One atomic batch upserts both adjacency entries at `weight`. A
    /// non-empty `properties` map replaces (not merges into) the edge's
    /// property record; an empty map leaves any existing record untouched.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: f64,
        properties: PropertyMap,
    ) -> GraphResult<()> {
        let (from, to) = (from.as_u64(), to.as_u64());
        let mut batch = Batch::new();
        batch.sorted_add(adjacency_key(from, Direction::Out), to, weight);
        batch.sorted_add(adjacency_key(to, Direction::In), from, weight);
        if !properties.is_empty() {
            batch.delete(edge_prop_key(from, to));
            batch.hash_set(edge_prop_key(from, to), properties);
        }
        self.kv.commit(batch)?;
        Ok(())
    }

    /// Remove the edge `from -> to`: both adjacency entries and the property
    /// record, in one atomic batch. Idempotent.
    pub fn del_edge(&mut self, from: NodeId, to: NodeId) -> GraphResult<()> {
        let (from, to) = (from.as_u64(), to.as_u64());
        let mut batch = Batch::new();
        batch.sorted_remove(adjacency_key(from, Direction::Out), to);
        batch.sorted_remove(adjacency_key(to, Direction::In), from);
        batch.delete(edge_prop_key(from, to));
        self.kv.commit(batch)?;
        Ok(())
    }

    /// Property map of the edge `from -> to`, or `None` if no record exists.
    pub fn get_edge(&self, from: NodeId, to: NodeId) -> GraphResult<Option<PropertyMap>> {
        Ok(self.kv.hash_get_all(&edge_prop_key(from.as_u64(), to.as_u64()))?)
    }

    /// Existence probe on the out-adjacency, no side effects.
    pub fn edge_exists(&self, from: NodeId, to: NodeId) -> GraphResult<bool> {
        let key = adjacency_key(from.as_u64(), Direction::Out);
        Ok(self.kv.sorted_score(&key, to.as_u64())?.is_some())
    }

    /* ---------- adjacency ---------- */

    /// The `page`-th window (1-indexed) of a node's adjacency set, ascending
    /// by weight.
    ///
    /// A pure rank-range slice: there is no snapshot isolation between
    /// pages, so a concurrent mutation between two page reads can shift or
    /// duplicate results.
    pub fn neighbors(
        &self,
        id: NodeId,
        direction: Direction,
        page: usize,
        page_size: usize,
    ) -> GraphResult<Vec<(NodeId, f64)>> {
        if page == 0 || page_size == 0 {
            return Err(GraphError::InvalidPage);
        }
        let start = ((page - 1) * page_size) as isize;
        let stop = start + page_size as isize - 1;
        let entries = self.kv.sorted_range(&adjacency_key(id.as_u64(), direction), start, stop)?;
        Ok(entries.into_iter().map(|(m, s)| (NodeId::new(m), s)).collect())
    }

    /// [`neighbors`](GraphStore::neighbors) with the store's configured page
    /// size.
    pub fn neighbors_page(
        &self,
        id: NodeId,
        direction: Direction,
        page: usize,
    ) -> GraphResult<Vec<(NodeId, f64)>> {
        self.neighbors(id, direction, page, self.page_size)
    }

    /// Full unpaginated adjacency list for one direction, ascending by
    /// weight.
    pub fn adjacency(&self, id: NodeId, direction: Direction) -> GraphResult<Vec<(NodeId, f64)>> {
        let entries = self.kv.sorted_range(&adjacency_key(id.as_u64(), direction), 0, -1)?;
        Ok(entries.into_iter().map(|(m, s)| (NodeId::new(m), s)).collect())
    }

    /* ---------- maintenance ---------- */

    /// Last assigned node id; live ids are a subset of `1..=last_node_id()`.
    pub fn last_node_id(&self) -> GraphResult<u64> {
        Ok(self.kv.counter_get(NODE_COUNTER_KEY)?)
    }

    /// Live node and edge counts, via a counter-range scan. Cosmetic
    /// reporting only; O(last id).
    pub fn stats(&self) -> GraphResult<GraphStats> {
        let mut stats = GraphStats { nodes: 0, edges: 0 };
        for id in 1..=self.last_node_id()? {
            if self.kv.hash_get_all(&node_key(id))?.is_some() {
                stats.nodes += 1;
            }
            stats.edges += self.kv.sorted_range(&adjacency_key(id, Direction::Out), 0, -1)?.len() as u64;
        }
        Ok(stats)
    }

    /// Drop the whole graph, id counter included.
    pub fn clear(&mut self) -> GraphResult<()> {
        self.kv.flush()?;
        Ok(())
    }
}
