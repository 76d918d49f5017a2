//! Root-transpose cache: `canon_hash -> (best_move, depth, score, generation)`.
//!
//! Same bucket/generation design as [`crate::search::tt::TranspositionTable`],
//! scaled down to a single best-move memo keyed by the position's canonical
//! (symmetry-folded) hash rather than its raw hash — two boards that are
//! rotations/reflections of each other share an entry here even though they
//! occupy different TT slots.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::board::Pos;

/// One root-transpose memo entry.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct RootEntry {
    pub canon_hash: u64,
    pub best_move: Pos,
    pub depth: i8,
    pub score: i32,
    pub generation: u32,
}

/// Canonical-hash best-move memo, generation-aged like the main TT.
pub struct RootCache {
    slots: Vec<Mutex<Option<RootEntry>>>,
    num_slots: usize,
    generation: AtomicU32,
}

impl RootCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let num_slots = capacity.max(256);
        Self {
            slots: (0..num_slots).map(|_| Mutex::new(None)).collect(),
            num_slots,
            generation: AtomicU32::new(1),
        }
    }

    #[inline]
    fn slot_index(&self, canon_hash: u64) -> usize {
        (canon_hash as usize) % self.num_slots
    }

    pub fn next_generation(&self) -> u32 {
        loop {
            let prev = self.generation.fetch_add(1, Ordering::Relaxed);
            let next = prev.wrapping_add(1);
            if next != 0 {
                return next;
            }
            let _ = self.generation.compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn get(&self, canon_hash: u64) -> Option<RootEntry> {
        let idx = self.slot_index(canon_hash);
        let mut slot = self.slots[idx].lock();
        match *slot {
            Some(entry) if entry.canon_hash == canon_hash => {
                let refreshed = RootEntry { generation: self.generation.load(Ordering::Relaxed), ..entry };
                *slot = Some(refreshed);
                Some(refreshed)
            }
            _ => None,
        }
    }

    /// Store an entry, replacing whatever currently occupies the slot
    /// unless the existing entry is deeper and from the current generation
    /// (the same depth-priority rule `tt.rs` uses).
    pub fn store(&self, canon_hash: u64, best_move: Pos, depth: i8, score: i32) {
        let idx = self.slot_index(canon_hash);
        let gen = self.generation.load(Ordering::Relaxed);
        let mut slot = self.slots[idx].lock();

        let should_replace = match *slot {
            None => true,
            Some(e) => e.canon_hash != canon_hash || e.generation != gen || e.depth <= depth,
        };
        if should_replace {
            *slot = Some(RootEntry { canon_hash, best_move, depth, score, generation: gen });
        }
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            *slot.lock() = None;
        }
        self.generation.store(1, Ordering::Relaxed);
    }

    /// Slot count, used to validate a persisted snapshot before applying it.
    #[must_use]
    pub fn shape(&self) -> usize {
        self.num_slots
    }

    #[must_use]
    pub fn export_entries(&self) -> Vec<RootEntry> {
        self.slots.iter().filter_map(|s| *s.lock()).collect()
    }

    pub fn load_entries(&self, entries: &[RootEntry]) {
        for entry in entries {
            self.store(entry.canon_hash, entry.best_move, entry.depth, entry.score);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.lock().is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
