//! Lazy-SMP parallel root search.
//!
//! Spawns several [`Searcher`] workers sharing one transposition table via
//! `Arc`. Each worker runs its own independent iterative-deepening search;
//! since they share the TT, a result one worker stores at a shallow depth
//! can prune another worker's deeper search of a transposing line, the
//! classic Lazy-SMP speedup — no root move splitting or work-stealing
//! coordination is needed beyond the shared table.
//!
//! Workers are staggered by depth offset (helper threads search one ply
//! deeper or shallower than the primary) so they explore genuinely
//! different parts of the tree rather than repeating identical work.

use std::sync::Arc;

use crate::board::{Board, Stone};

use super::alphabeta::{SearchResult, Searcher};
use super::tt::TranspositionTable;

/// Run a Lazy-SMP search with `num_workers` threads sharing one
/// transposition table. The primary worker (offset 0) searches to exactly
/// `max_depth`; helper workers are staggered by `+-1` ply to diversify
/// their search order. Returns the result from whichever worker reached
/// the greatest completed depth (ties broken by higher score for `color`).
#[must_use]
pub fn search_parallel(
    board: &Board,
    color: Stone,
    max_depth: i8,
    time_limit_ms: u64,
    tt_size_mb: usize,
    num_workers: usize,
) -> SearchResult {
    search_parallel_with(board, color, max_depth, time_limit_ms, tt_size_mb, num_workers, None)
}

/// Like [`search_parallel`], but threads an explicit `min_depth` floor
/// (sourced from [`crate::config::Config::min_depth`]) and an optional
/// must-capture `root_candidates` restriction through to every worker.
#[must_use]
pub fn search_parallel_with(
    board: &Board,
    color: Stone,
    max_depth: i8,
    time_limit_ms: u64,
    tt_size_mb: usize,
    num_workers: usize,
    root_candidates: Option<&[crate::board::Pos]>,
) -> SearchResult {
    let num_workers = num_workers.max(1);
    let shared_tt = Arc::new(TranspositionTable::new(tt_size_mb));
    let min_depth = super::alphabeta::DEFAULT_MIN_DEPTH.min(max_depth);

    if num_workers == 1 {
        let mut searcher = Searcher::with_shared_tt(shared_tt);
        return searcher.search_timed_with(board, color, max_depth, time_limit_ms, min_depth, root_candidates);
    }

    use rayon::prelude::*;

    let results: Vec<SearchResult> = (0..num_workers)
        .into_par_iter()
        .map(|i| {
            let tt = Arc::clone(&shared_tt);
            let depth_offset: i8 = match i % 3 {
                0 => 0,
                1 => 1,
                _ => -1,
            };
            let worker_depth = (max_depth + depth_offset).max(1);
            let mut searcher = Searcher::with_shared_tt(tt);
            searcher.search_timed_with(
                board,
                color,
                worker_depth,
                time_limit_ms,
                min_depth.min(worker_depth),
                root_candidates,
            )
        })
        .collect();

    best_result(results)
}

/// Pick the strongest result among Lazy-SMP workers: greatest completed
/// depth first, then highest score (all scores are already from `color`'s
/// perspective since each worker called `search_timed` with the same
/// `color`).
fn best_result(results: Vec<SearchResult>) -> SearchResult {
    results
        .into_iter()
        .max_by(|a, b| (a.depth, a.score).cmp(&(b.depth, b.score)))
        .unwrap_or(SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    #[test]
    fn test_search_parallel_empty_board_plays_center() {
        let board = Board::new();
        let result = search_parallel(&board, Stone::Black, 4, 500, 4, 2);
        assert_eq!(result.best_move, Some(Pos::new(9, 9)));
    }

    #[test]
    fn test_search_parallel_single_worker_matches_serial() {
        let board = Board::new();
        let result = search_parallel(&board, Stone::Black, 4, 500, 4, 1);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_search_parallel_finds_winning_move() {
        let mut board = Board::new();
        for i in 0..4 {
            board.place_stone(Pos::new(9, i), Stone::Black);
        }
        let result = search_parallel(&board, Stone::Black, 4, 500, 4, 3);
        assert_eq!(result.best_move, Some(Pos::new(9, 4)));
    }
}
