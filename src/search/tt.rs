//! Transposition table for caching search results.
//!
//! Set-associative: `num_slots` slots, each holding `buckets` entries. Every
//! entry is scoped by a `heuristic_hash` (a fingerprint of the active
//! evaluator weights) so that probes from a search running under different
//! weights never reuse a stale score. Entries age via a process-wide
//! generation counter so that stale lines are reclaimed under pressure
//! without an explicit clear.
//!
//! Concurrent-safe: each slot is guarded by its own `parking_lot::Mutex`, so
//! parallel root workers can probe/store without contending on a single
//! global lock and without tearing an entry mid-write.

use crate::board::Pos;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Entry type for score interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EntryType {
    /// Exact score: the search completed normally within the window.
    Exact,
    /// Lower bound: true score >= stored value (beta cutoff).
    LowerBound,
    /// Upper bound: true score <= stored value (alpha fail-low).
    UpperBound,
}

/// Transposition table entry.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct TTEntry {
    pub key: u64,
    pub heuristic_hash: u64,
    pub depth: i8,
    pub score: i32,
    pub entry_type: EntryType,
    pub best_move: Option<Pos>,
    pub generation: u32,
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    pub size: usize,
    pub used: usize,
    pub usage_percent: u8,
}

type Bucket = Vec<Option<TTEntry>>;

/// Set-associative, generation-aged, heuristic-scoped transposition table.
pub struct TranspositionTable {
    slots: Vec<Mutex<Bucket>>,
    num_slots: usize,
    buckets: usize,
    generation: AtomicU32,
}

impl TranspositionTable {
    /// Entries per slot. Four ways balances collision resistance against
    /// per-probe lock-hold time; the corpus's own lockless TT design
    /// (`other_examples` packed-atomic table) uses a single way per slot and
    /// relies on replacement alone, but a search this selective benefits
    /// from a few ways of same-key safety net.
    pub const DEFAULT_BUCKETS: usize = 4;

    /// Build a table sized in megabytes with the default bucket count.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        Self::with_buckets(size_mb, Self::DEFAULT_BUCKETS)
    }

    #[must_use]
    pub fn with_buckets(size_mb: usize, buckets: usize) -> Self {
        let buckets = buckets.max(1);
        let entry_size = std::mem::size_of::<Option<TTEntry>>();
        let total_entries = (size_mb * 1024 * 1024) / entry_size.max(1);
        let num_slots = (total_entries / buckets).max(256);

        let slots = (0..num_slots)
            .map(|_| Mutex::new(vec![None; buckets]))
            .collect();

        Self {
            slots,
            num_slots,
            buckets,
            generation: AtomicU32::new(1),
        }
    }

    #[inline]
    fn slot_index(&self, key: u64) -> usize {
        (key as usize) % self.num_slots
    }

    /// Advance to the next search generation. Skips zero on wrap, since zero
    /// is reserved to mean "entry never written".
    pub fn next_generation(&self) -> u32 {
        loop {
            let prev = self.generation.fetch_add(1, Ordering::Relaxed);
            let next = prev.wrapping_add(1);
            if next != 0 {
                return next;
            }
            // Wrapped to zero: bump again so callers never observe it.
            let _ = self
                .generation
                .compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn current_generation(&self) -> u32 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Probe for a position scoped to `heuristic_hash`. On hit, the entry's
    /// generation is refreshed to the table's current generation.
    #[must_use]
    pub fn probe(
        &self,
        key: u64,
        heuristic_hash: u64,
        depth: i8,
        alpha: i32,
        beta: i32,
    ) -> Option<(i32, Option<Pos>)> {
        let idx = self.slot_index(key);
        let mut bucket = self.slots[idx].lock();
        let gen = self.generation.load(Ordering::Relaxed);

        for slot in bucket.iter_mut() {
            if let Some(entry) = slot {
                if entry.key == key && entry.heuristic_hash == heuristic_hash {
                    entry.generation = gen;
                    if entry.depth >= depth {
                        match entry.entry_type {
                            EntryType::Exact => return Some((entry.score, entry.best_move)),
                            EntryType::LowerBound if entry.score >= beta => {
                                return Some((entry.score, entry.best_move));
                            }
                            EntryType::UpperBound if entry.score <= alpha => {
                                return Some((entry.score, entry.best_move));
                            }
                            _ => {}
                        }
                    }
                    return Some((0, entry.best_move));
                }
            }
        }
        None
    }

    #[must_use]
    pub fn get_best_move(&self, key: u64, heuristic_hash: u64) -> Option<Pos> {
        let idx = self.slot_index(key);
        let bucket = self.slots[idx].lock();
        bucket.iter().find_map(|slot| {
            slot.and_then(|e| {
                if e.key == key && e.heuristic_hash == heuristic_hash {
                    e.best_move
                } else {
                    None
                }
            })
        })
    }

    /// Store a position, scoped to `heuristic_hash`.
    ///
    /// Replacement within the bucket prefers, in order: an empty way, a way
    /// scoped to a different heuristic (stale weights), the way with the
    /// oldest generation, then the shallowest depth. The chosen way is
    /// overwritten only if the new entry is at least as deep or the
    /// existing one is from a prior generation.
    pub fn store(
        &self,
        key: u64,
        heuristic_hash: u64,
        depth: i8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        let idx = self.slot_index(key);
        let gen = self.generation.load(Ordering::Relaxed);
        let mut bucket = self.slots[idx].lock();

        // Exact same key+scope already present: always refresh in place.
        if let Some(way) = bucket
            .iter()
            .position(|s| matches!(s, Some(e) if e.key == key && e.heuristic_hash == heuristic_hash))
        {
            bucket[way] = Some(TTEntry {
                key,
                heuristic_hash,
                depth,
                score,
                entry_type,
                best_move,
                generation: gen,
            });
            return;
        }

        let victim = Self::pick_victim(&bucket, heuristic_hash, gen);
        let should_replace = match &bucket[victim] {
            None => true,
            Some(e) => e.heuristic_hash != heuristic_hash || e.generation != gen || e.depth <= depth,
        };
        if should_replace {
            bucket[victim] = Some(TTEntry {
                key,
                heuristic_hash,
                depth,
                score,
                entry_type,
                best_move,
                generation: gen,
            });
        }
    }

    fn pick_victim(bucket: &Bucket, heuristic_hash: u64, current_gen: u32) -> usize {
        if let Some(empty) = bucket.iter().position(|s| s.is_none()) {
            return empty;
        }
        if let Some(stale_scope) = bucket
            .iter()
            .position(|s| matches!(s, Some(e) if e.heuristic_hash != heuristic_hash))
        {
            return stale_scope;
        }
        // Oldest generation first, shallowest depth as tiebreak.
        let mut best = 0usize;
        let mut best_key = (u32::MAX, i8::MAX);
        for (i, slot) in bucket.iter().enumerate() {
            if let Some(e) = slot {
                let age = current_gen.wrapping_sub(e.generation);
                let key = (u32::MAX - age, e.depth);
                if key < best_key {
                    best_key = key;
                    best = i;
                }
            }
        }
        best
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            let mut bucket = slot.lock();
            for e in bucket.iter_mut() {
                *e = None;
            }
        }
        self.generation.store(1, Ordering::Relaxed);
    }

    /// Invalidate every entry scoped to `heuristic_hash`, returning the
    /// count removed. Used when the active evaluator weights change and the
    /// operator wants to reclaim that scope's entries rather than wait for
    /// generation aging to evict them.
    pub fn delete_by_heuristic_hash(&self, heuristic_hash: u64) -> usize {
        let mut removed = 0;
        for slot in &self.slots {
            let mut bucket = slot.lock();
            for e in bucket.iter_mut() {
                if matches!(e, Some(entry) if entry.heuristic_hash == heuristic_hash) {
                    *e = None;
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Slot count and ways-per-slot, used to validate a persisted snapshot
    /// against the table it's being loaded into (§4.8: mismatches skip the
    /// snapshot rather than apply it).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_slots, self.buckets)
    }

    /// Flatten every occupied entry out for serialization. Order is
    /// slot-major; callers don't depend on it beyond round-tripping through
    /// [`Self::load_entries`].
    #[must_use]
    pub fn export_entries(&self) -> Vec<TTEntry> {
        let mut out = Vec::new();
        for slot in &self.slots {
            let bucket = slot.lock();
            out.extend(bucket.iter().filter_map(|e| *e));
        }
        out
    }

    /// Repopulate from a previously exported entry list. Does not clear
    /// first — call [`Self::clear`] beforehand if a clean load is wanted.
    pub fn load_entries(&self, entries: &[TTEntry]) {
        for entry in entries {
            self.store(
                entry.key,
                entry.heuristic_hash,
                entry.depth,
                entry.score,
                entry.entry_type,
                entry.best_move,
            );
        }
    }

    #[must_use]
    pub fn stats(&self) -> TTStats {
        let mut used = 0usize;
        for slot in &self.slots {
            let bucket = slot.lock();
            used += bucket.iter().filter(|e| e.is_some()).count();
        }
        let size = self.num_slots * self.buckets;
        TTStats {
            size,
            used,
            usage_percent: if size == 0 { 0 } else { (used * 100 / size) as u8 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: u64 = 0xABCD;

    #[test]
    fn test_tt_store_probe_exact() {
        let tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;
        tt.store(hash, H, 5, 100, EntryType::Exact, Some(Pos::new(9, 9)));
        let (score, best_move) = tt.probe(hash, H, 5, -1000, 1000).unwrap();
        assert_eq!(score, 100);
        assert_eq!(best_move, Some(Pos::new(9, 9)));
    }

    #[test]
    fn test_tt_depth_requirement() {
        let tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;
        tt.store(hash, H, 3, 100, EntryType::Exact, Some(Pos::new(5, 5)));
        let (score, best_move) = tt.probe(hash, H, 5, -1000, 1000).unwrap();
        assert_eq!(score, 0);
        assert_eq!(best_move, Some(Pos::new(5, 5)));
    }

    #[test]
    fn test_tt_heuristic_scope_mismatch_is_a_miss() {
        let tt = TranspositionTable::new(1);
        let hash = 0x123456789ABCDEF0;
        tt.store(hash, H, 5, 100, EntryType::Exact, Some(Pos::new(9, 9)));
        assert!(tt.probe(hash, H ^ 1, 5, -1000, 1000).is_none());
    }

    #[test]
    fn test_tt_lower_bound_cutoff() {
        let tt = TranspositionTable::new(1);
        let hash = 0x111;
        tt.store(hash, H, 5, 200, EntryType::LowerBound, None);
        assert_eq!(tt.probe(hash, H, 5, -1000, 150).unwrap().0, 200);
        assert_eq!(tt.probe(hash, H, 5, -1000, 300).unwrap().0, 0);
    }

    #[test]
    fn test_tt_upper_bound_cutoff() {
        let tt = TranspositionTable::new(1);
        let hash = 0x222;
        tt.store(hash, H, 5, 50, EntryType::UpperBound, None);
        assert_eq!(tt.probe(hash, H, 5, 100, 1000).unwrap().0, 50);
        assert_eq!(tt.probe(hash, H, 5, 30, 1000).unwrap().0, 0);
    }

    #[test]
    fn test_tt_multiple_keys_same_slot_coexist_within_buckets() {
        // 4 distinct keys funneled into a small table; all fit across ways.
        let tt = TranspositionTable::with_buckets(1, 4);
        for i in 0..4u64 {
            tt.store(i, H, 5, i as i32, EntryType::Exact, None);
        }
        for i in 0..4u64 {
            assert_eq!(tt.probe(i, H, 5, -1000, 1000).unwrap().0, i as i32);
        }
    }

    #[test]
    fn test_tt_clear() {
        let tt = TranspositionTable::new(1);
        tt.store(0x999, H, 5, 100, EntryType::Exact, None);
        tt.clear();
        assert!(tt.probe(0x999, H, 5, -1000, 1000).is_none());
    }

    #[test]
    fn test_tt_generation_skips_zero_on_wrap() {
        let tt = TranspositionTable::new(1);
        tt.generation.store(u32::MAX, Ordering::Relaxed);
        let g = tt.next_generation();
        assert_ne!(g, 0);
    }

    #[test]
    fn test_tt_delete_by_heuristic_hash() {
        let tt = TranspositionTable::new(1);
        tt.store(0x1, H, 5, 1, EntryType::Exact, None);
        tt.store(0x2, H + 1, 5, 2, EntryType::Exact, None);
        let removed = tt.delete_by_heuristic_hash(H);
        assert_eq!(removed, 1);
        assert!(tt.probe(0x1, H, 5, -1000, 1000).is_none());
        assert!(tt.probe(0x2, H + 1, 5, -1000, 1000).is_some());
    }

    #[test]
    fn test_tt_stats() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.stats().used, 0);
        tt.store(0x111, H, 5, 100, EntryType::Exact, None);
        tt.store(0x222, H, 5, 100, EntryType::Exact, None);
        let stats = tt.stats();
        assert_eq!(stats.used, 2);
        assert!(stats.size > 0);
    }
}
