//! Cache subsystem: root-transpose best-move memo, evaluator score cache,
//! and search statistics — the long-lived state that survives across
//! `score_board` calls (and, via [`crate::persistence`], across process
//! restarts).

pub mod eval_cache;
pub mod root_cache;
pub mod stats;

pub use eval_cache::EvalCache;
pub use root_cache::RootCache;
pub use stats::SearchStats;
