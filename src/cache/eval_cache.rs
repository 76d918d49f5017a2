//! Whole-board evaluation cache: `(zobrist_hash, heuristic_hash) -> score`.
//!
//! Same bucket shape as [`crate::search::tt::TranspositionTable`] but with no
//! depth/entry-type bookkeeping — an eval-cache hit is always exact for the
//! position it was stored under. Eviction is FIFO (insertion order), chosen
//! over random replacement so that a fixed sequence of `get`/`store` calls
//! produces a deterministic occupancy, matching the determinism invariant in
//! the spec's testable-properties section.

use parking_lot::Mutex;
use std::collections::VecDeque;

struct EvalEntry {
    heuristic_hash: u64,
    score: i32,
}

struct Inner {
    slots: std::collections::HashMap<u64, EvalEntry>,
    order: VecDeque<u64>,
}

/// FIFO-evicted whole-board score cache, scoped per evaluator weight table.
pub struct EvalCache {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl EvalCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                slots: std::collections::HashMap::with_capacity(capacity.min(1 << 16)),
                order: VecDeque::with_capacity(capacity.min(1 << 16)),
            }),
            capacity,
        }
    }

    /// Look up a cached score. Returns `None` on a miss, or if the entry was
    /// written under a different evaluator weight table.
    #[must_use]
    pub fn get(&self, hash: u64, heuristic_hash: u64) -> Option<i32> {
        let inner = self.inner.lock();
        inner.slots.get(&hash).and_then(|e| {
            if e.heuristic_hash == heuristic_hash {
                Some(e.score)
            } else {
                None
            }
        })
    }

    /// Store a score, evicting the oldest entry first if at capacity.
    /// Overwriting an existing key does not change its eviction order.
    pub fn store(&self, hash: u64, heuristic_hash: u64, score: i32) {
        let mut inner = self.inner.lock();
        if !inner.slots.contains_key(&hash) {
            if inner.slots.len() >= self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.slots.remove(&oldest);
                }
            }
            inner.order.push_back(hash);
        }
        inner.slots.insert(hash, EvalEntry { heuristic_hash, score });
    }

    /// Drop every entry scoped to a stale heuristic hash, e.g. after a
    /// weight-table reload. Returns the number of entries removed.
    pub fn delete_by_heuristic_hash(&self, heuristic_hash: u64) -> usize {
        let mut inner = self.inner.lock();
        let stale: Vec<u64> = inner
            .slots
            .iter()
            .filter(|(_, e)| e.heuristic_hash == heuristic_hash)
            .map(|(k, _)| *k)
            .collect();
        for key in &stale {
            inner.slots.remove(key);
        }
        inner.order.retain(|k| inner.slots.contains_key(k));
        stale.len()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten the cache out as `(hash, heuristic_hash, score)` triples, in
    /// FIFO order, for serialization.
    #[must_use]
    pub fn export_entries(&self) -> Vec<(u64, u64, i32)> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|h| inner.slots.get(h).map(|e| (*h, e.heuristic_hash, e.score)))
            .collect()
    }

    /// Repopulate from a previously exported entry list, preserving FIFO
    /// order. Does not clear first.
    pub fn load_entries(&self, entries: &[(u64, u64, i32)]) {
        for &(hash, heuristic_hash, score) in entries {
            self.store(hash, heuristic_hash, score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_get_hits() {
        let cache = EvalCache::new(8);
        cache.store(1, 100, 555);
        assert_eq!(cache.get(1, 100), Some(555));
    }

    #[test]
    fn test_get_miss_on_different_heuristic_hash() {
        let cache = EvalCache::new(8);
        cache.store(1, 100, 555);
        assert_eq!(cache.get(1, 200), None);
    }

    #[test]
    fn test_fifo_eviction_drops_oldest_first() {
        let cache = EvalCache::new(2);
        cache.store(1, 0, 10);
        cache.store(2, 0, 20);
        cache.store(3, 0, 30);
        assert_eq!(cache.get(1, 0), None);
        assert_eq!(cache.get(2, 0), Some(20));
        assert_eq!(cache.get(3, 0), Some(30));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_delete_by_heuristic_hash_removes_only_matching() {
        let cache = EvalCache::new(8);
        cache.store(1, 100, 1);
        cache.store(2, 200, 2);
        let removed = cache.delete_by_heuristic_hash(100);
        assert_eq!(removed, 1);
        assert_eq!(cache.get(1, 100), None);
        assert_eq!(cache.get(2, 200), Some(2));
    }

    #[test]
    fn test_overwrite_does_not_change_eviction_order() {
        let cache = EvalCache::new(2);
        cache.store(1, 0, 10);
        cache.store(2, 0, 20);
        cache.store(1, 0, 11); // overwrite, not a new slot
        cache.store(3, 0, 30); // should evict key 1 (oldest by insertion), not 2
        assert_eq!(cache.get(1, 0), None);
        assert_eq!(cache.get(2, 0), Some(20));
        assert_eq!(cache.get(3, 0), Some(30));
    }
}
