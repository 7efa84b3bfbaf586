//! In-memory reference implementation of the store contract

use super::{Batch, BatchOp, KvResult, KvStore};
use crate::graph::property::PropertyMap;
use std::collections::HashMap;

/// In-memory store backed by plain hash maps.
///
/// Ordered-set ranges sort by `(score, member)` ascending, so reads are
/// deterministic even when scores tie. An ordered set whose last member is
/// removed ceases to exist, matching the usual key-value store behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    counters: HashMap<String, u64>,
    hashes: HashMap<String, PropertyMap>,
    sorted: HashMap<String, HashMap<u64, f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn apply(&mut self, op: BatchOp) {
        match op {
            BatchOp::HashSet { key, fields } => {
                let map = self.hashes.entry(key).or_default();
                for (field, value) in fields {
                    map.insert(field, value);
                }
            }
            BatchOp::Delete { key } => {
                self.hashes.remove(&key);
                self.sorted.remove(&key);
            }
            BatchOp::SortedAdd { key, member, score } => {
                self.sorted.entry(key).or_default().insert(member, score);
            }
            BatchOp::SortedRemove { key, member } => {
                if let Some(set) = self.sorted.get_mut(&key) {
                    set.remove(&member);
                    if set.is_empty() {
                        self.sorted.remove(&key);
                    }
                }
            }
        }
    }
}

impl KvStore for MemoryStore {
    fn counter_next(&mut self, key: &str) -> KvResult<u64> {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    fn counter_get(&self, key: &str) -> KvResult<u64> {
        Ok(self.counters.get(key).copied().unwrap_or(0))
    }

    fn hash_set(&mut self, key: &str, fields: PropertyMap) -> KvResult<()> {
        let map = self.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            map.insert(field, value);
        }
        Ok(())
    }

    fn hash_get_all(&self, key: &str) -> KvResult<Option<PropertyMap>> {
        Ok(self.hashes.get(key).cloned())
    }

    fn sorted_add(&mut self, key: &str, member: u64, score: f64) -> KvResult<()> {
        self.sorted.entry(key.to_string()).or_default().insert(member, score);
        Ok(())
    }

    fn sorted_remove(&mut self, key: &str, member: u64) -> KvResult<()> {
        if let Some(set) = self.sorted.get_mut(key) {
            set.remove(&member);
            if set.is_empty() {
                self.sorted.remove(key);
            }
        }
        Ok(())
    }

    fn sorted_range(&self, key: &str, start: isize, stop: isize) -> KvResult<Vec<(u64, f64)>> {
        let Some(set) = self.sorted.get(key) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<(u64, f64)> = set.iter().map(|(m, s)| (*m, *s)).collect();
        entries.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let len = entries.len() as isize;
        let mut start = if start < 0 { len + start } else { start };
        let mut stop = if stop < 0 { len + stop } else { stop };
        if start < 0 {
            start = 0;
        }
        if stop >= len {
            stop = len - 1;
        }
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(entries[start as usize..=stop as usize].to_vec())
    }

    fn sorted_score(&self, key: &str, member: u64) -> KvResult<Option<f64>> {
        Ok(self.sorted.get(key).and_then(|set| set.get(&member).copied()))
    }

    fn delete(&mut self, key: &str) -> KvResult<()> {
        self.hashes.remove(key);
        self.sorted.remove(key);
        Ok(())
    }

    fn flush(&mut self) -> KvResult<()> {
        self.counters.clear();
        self.hashes.clear();
        self.sorted.clear();
        Ok(())
    }

    fn commit(&mut self, batch: Batch) -> KvResult<()> {
        for op in batch.into_ops() {
            self.apply(op);
        }
        Ok(())
    }
}
