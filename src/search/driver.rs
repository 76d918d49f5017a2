//! Search driver: the entry points the engine orchestrator calls into.
//!
//! Mirrors the staged pipeline `engine.rs` used to run by hand (opening
//! book, break-five, immediate win, VCF, alpha-beta): [`score_board`] first
//! checks [`GameState::must_capture`] — a statically breakable five leaves
//! only the break moves legal, so the search is restricted to
//! `state.forced_capture_moves` outright — then falls back to
//! [`crate::search::tactics::tactical_candidates`] for a single forced
//! reply (our win, or the one move that blocks the opponent's), answering
//! instantly if so and skipping the iterative-deepening search entirely.
//! Otherwise it hands off to [`Searcher::search_timed_with`], whose own
//! move ordering already places winning/blocking/forcing moves first — the
//! tactical pre-check is a fast path, not a gate the alpha-beta search
//! depends on for the result to be correct.
//! [`score_board_direct_depth_parallel`] is the Lazy-SMP variant used when
//! the caller has CPU budget to spend on a single move.

use tracing::{debug, info};

use crate::board::{Board, Pos, Stone};
use crate::game_state::{GameState, Rules};

use super::alphabeta::{SearchResult, Searcher};
use super::parallel::search_parallel_with;
use super::tactics::tactical_candidates;

/// Depth/time budget handed to [`score_board`]/[`score_board_direct_depth_parallel`].
/// `min_depth` is the floor the searcher always reaches before honoring
/// `timeout_ms` (see [`crate::config::Config::min_depth`]).
#[derive(Debug, Clone, Copy)]
pub struct AiScoreSettings {
    pub max_depth: i8,
    pub timeout_ms: u64,
    pub min_depth: i8,
}

/// Run the staged search pipeline for one move: must-capture restriction,
/// tactical fast path, then full iterative-deepening alpha-beta within
/// `settings.timeout_ms`.
#[must_use]
pub fn score_board(
    state: &GameState,
    rules: &Rules,
    searcher: &mut Searcher,
    settings: AiScoreSettings,
) -> SearchResult {
    let board = &state.board;
    let color = state.to_move;

    if state.must_capture {
        let candidates = &state.forced_capture_moves;
        if let [only] = candidates[..] {
            debug!(target: "ai::search", move_pos = ?only, "must-capture fast path: forced single break");
            return SearchResult {
                best_move: Some(only),
                score: 0,
                depth: 0,
                nodes: 1,
            };
        }
        debug!(
            target: "ai::search",
            candidates = candidates.len(),
            "must-capture: multiple forced breaks, restricting search to them"
        );
        let result = searcher.search_timed_with(
            board,
            color,
            settings.max_depth,
            settings.timeout_ms,
            settings.min_depth,
            Some(candidates.as_slice()),
        );
        info!(target: "ai::search", depth = result.depth, nodes = result.nodes, score = result.score, "must-capture search complete");
        return result;
    }

    if let Some(candidates) = tactical_candidates(board, color, rules.capture_win_pairs) {
        if let [only] = candidates[..] {
            debug!(target: "ai::search", move_pos = ?only, "tactical fast path: forced single reply");
            return SearchResult {
                best_move: Some(only),
                score: 0,
                depth: 0,
                nodes: 1,
            };
        }
        debug!(
            target: "ai::search",
            candidates = candidates.len(),
            "tactical fast path: forcing set found, deferring to full search"
        );
    }

    let result = searcher.search_timed_with(
        board,
        color,
        settings.max_depth,
        settings.timeout_ms,
        settings.min_depth,
        None,
    );
    info!(
        target: "ai::search",
        depth = result.depth,
        nodes = result.nodes,
        score = result.score,
        "search complete"
    );
    result
}

/// Lazy-SMP variant of [`score_board`]: runs `num_workers` searchers
/// sharing one transposition table and returns the strongest result. Skips
/// straight to the parallel search if there's no single forced reply
/// (must-capture or tactical), since spinning up workers for a one-move
/// fast path would only waste threads.
#[must_use]
pub fn score_board_direct_depth_parallel(
    state: &GameState,
    rules: &Rules,
    settings: AiScoreSettings,
    tt_size_mb: usize,
    num_workers: usize,
) -> SearchResult {
    let board = &state.board;
    let color = state.to_move;

    if state.must_capture {
        let candidates = &state.forced_capture_moves;
        if let [only] = candidates[..] {
            return SearchResult {
                best_move: Some(only),
                score: 0,
                depth: 0,
                nodes: 1,
            };
        }
        let result = search_parallel_with(
            board,
            color,
            settings.max_depth,
            settings.timeout_ms,
            tt_size_mb,
            num_workers,
            Some(candidates.as_slice()),
        );
        info!(target: "ai::search", depth = result.depth, nodes = result.nodes, score = result.score, workers = num_workers, "must-capture parallel search complete");
        return result;
    }

    if let Some(candidates) = tactical_candidates(board, color, rules.capture_win_pairs) {
        if let [only] = candidates[..] {
            return SearchResult {
                best_move: Some(only),
                score: 0,
                depth: 0,
                nodes: 1,
            };
        }
    }

    let result = search_parallel_with(
        board,
        color,
        settings.max_depth,
        settings.timeout_ms,
        tt_size_mb,
        num_workers,
        None,
    );
    info!(
        target: "ai::search",
        depth = result.depth,
        nodes = result.nodes,
        score = result.score,
        workers = num_workers,
        "parallel search complete"
    );
    result
}

/// Helper for callers that just want a move, discarding search metadata.
#[must_use]
pub fn best_move(result: &SearchResult) -> Option<Pos> {
    result.best_move
}
