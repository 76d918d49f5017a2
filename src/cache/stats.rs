//! Atomic search-run counters, read concurrently by any worker and reported
//! back through [`crate::search::alphabeta::SearchResult`] and logging.
//!
//! Grounded on the teacher's [`crate::search::tt::TTStats`] shape (hits,
//! misses, stores) generalized into a whole-search counter set that also
//! tracks eval-cache traffic and tactical fast-path hits.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for one search call (or, shared across workers, one
/// Lazy-SMP root search). All increments use `Relaxed` ordering — these are
/// diagnostics, not synchronization points.
#[derive(Default)]
pub struct SearchStats {
    pub nodes_visited: AtomicU64,
    pub tt_hits: AtomicU64,
    pub tt_misses: AtomicU64,
    pub eval_cache_hits: AtomicU64,
    pub eval_cache_misses: AtomicU64,
    pub tactical_fast_paths: AtomicU64,
    pub beta_cutoffs: AtomicU64,
}

impl SearchStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_node(&self) {
        self.nodes_visited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tt_probe(&self, hit: bool) {
        if hit {
            self.tt_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tt_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_eval_cache_probe(&self, hit: bool) {
        if hit {
            self.eval_cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.eval_cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_tactical_fast_path(&self) {
        self.tactical_fast_paths.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_beta_cutoff(&self) {
        self.beta_cutoffs.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters as plain values, e.g. for a `tracing` event or
    /// a UI status line.
    #[must_use]
    pub fn snapshot(&self) -> SearchStatsSnapshot {
        SearchStatsSnapshot {
            nodes_visited: self.nodes_visited.load(Ordering::Relaxed),
            tt_hits: self.tt_hits.load(Ordering::Relaxed),
            tt_misses: self.tt_misses.load(Ordering::Relaxed),
            eval_cache_hits: self.eval_cache_hits.load(Ordering::Relaxed),
            eval_cache_misses: self.eval_cache_misses.load(Ordering::Relaxed),
            tactical_fast_paths: self.tactical_fast_paths.load(Ordering::Relaxed),
            beta_cutoffs: self.beta_cutoffs.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.nodes_visited.store(0, Ordering::Relaxed);
        self.tt_hits.store(0, Ordering::Relaxed);
        self.tt_misses.store(0, Ordering::Relaxed);
        self.eval_cache_hits.store(0, Ordering::Relaxed);
        self.eval_cache_misses.store(0, Ordering::Relaxed);
        self.tactical_fast_paths.store(0, Ordering::Relaxed);
        self.beta_cutoffs.store(0, Ordering::Relaxed);
    }
}

/// Plain-value snapshot of [`SearchStats`], cheap to log or serialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatsSnapshot {
    pub nodes_visited: u64,
    pub tt_hits: u64,
    pub tt_misses: u64,
    pub eval_cache_hits: u64,
    pub eval_cache_misses: u64,
    pub tactical_fast_paths: u64,
    pub beta_cutoffs: u64,
}

impl SearchStatsSnapshot {
    #[must_use]
    pub fn tt_hit_rate(&self) -> f64 {
        let total = self.tt_hits + self.tt_misses;
        if total == 0 {
            0.0
        } else {
            self.tt_hits as f64 / total as f64
        }
    }
}
