//! Key-value store contract the graph layer runs on.
//!
//! The graph never talks to a concrete store: it is written against
//! [`KvStore`], which exposes atomic counters, per-key field maps, per-key
//! ordered score-to-member sets, and an all-or-nothing batched commit. Any
//! backend satisfying the trait is interchangeable; [`memory::MemoryStore`]
//! is the in-process reference implementation.

pub mod memory;

use crate::graph::property::PropertyMap;
use thiserror::Error;

/// Errors surfaced by a store backend.
///
/// Backend failures are never retried; they propagate unchanged to the
/// caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KvError {
    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type KvResult<T> = Result<T, KvError>;

/// A single mutation inside a batched commit
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Merge fields into the map at `key`, creating the key if absent
    HashSet { key: String, fields: PropertyMap },
    /// Drop `key` entirely, whatever its type
    Delete { key: String },
    /// Upsert `member` into the ordered set at `key` with `score`
    SortedAdd { key: String, member: u64, score: f64 },
    /// Remove `member` from the ordered set at `key`
    SortedRemove { key: String, member: u64 },
}

/// Unit of work: collects mutations and commits exactly once.
///
/// [`KvStore::commit`] applies the collected operations all-or-nothing, in
/// insertion order. The batch is the only atomicity unit the contract
/// offers; it provides no isolation from other callers of the same store.
#[derive(Debug, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Batch::default()
    }

    pub fn hash_set(&mut self, key: impl Into<String>, fields: PropertyMap) -> &mut Self {
        self.ops.push(BatchOp::HashSet { key: key.into(), fields });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Delete { key: key.into() });
        self
    }

    pub fn sorted_add(&mut self, key: impl Into<String>, member: u64, score: f64) -> &mut Self {
        self.ops.push(BatchOp::SortedAdd { key: key.into(), member, score });
        self
    }

    pub fn sorted_remove(&mut self, key: impl Into<String>, member: u64) -> &mut Self {
        self.ops.push(BatchOp::SortedRemove { key: key.into(), member });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Store contract required by the graph layer.
///
/// Counters are process-scoped state owned by the adapter; a persistent
/// backend is expected to initialize them from the current maximum on
/// startup so ids keep increasing across restarts.
pub trait KvStore {
    /// Atomically increment the counter at `key` and return the new value.
    /// A fresh counter yields 1.
    fn counter_next(&mut self, key: &str) -> KvResult<u64>;

    /// Current counter value, 0 if the counter was never incremented.
    fn counter_get(&self, key: &str) -> KvResult<u64>;

    /// Merge `fields` into the map at `key`, creating the key if absent.
    /// An empty `fields` map still creates the key.
    fn hash_set(&mut self, key: &str, fields: PropertyMap) -> KvResult<()>;

    /// Whole map at `key`; `None` if the key does not exist (distinct from
    /// an existing empty map).
    fn hash_get_all(&self, key: &str) -> KvResult<Option<PropertyMap>>;

    /// Upsert `member` with `score` into the ordered set at `key`.
    fn sorted_add(&mut self, key: &str, member: u64, score: f64) -> KvResult<()>;

    /// Remove `member` from the ordered set at `key`.
    fn sorted_remove(&mut self, key: &str, member: u64) -> KvResult<()>;

    /// Rank-range slice of the ordered set at `key`, score-ascending.
    /// Negative indices count from the end, `-1` being the last member.
    fn sorted_range(&self, key: &str, start: isize, stop: isize) -> KvResult<Vec<(u64, f64)>>;

    /// Score of `member` in the ordered set at `key`, if present.
    fn sorted_score(&self, key: &str, member: u64) -> KvResult<Option<f64>>;

    /// Drop `key` entirely, whatever its type. Missing keys are a no-op.
    fn delete(&mut self, key: &str) -> KvResult<()>;

    /// Drop everything, counters included.
    fn flush(&mut self) -> KvResult<()>;

    /// Apply a collected batch all-or-nothing, in insertion order.
    fn commit(&mut self, batch: Batch) -> KvResult<()>;
}
