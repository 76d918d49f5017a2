//! Main AI Engine integrating all search components
//!
//! This module provides the main AI engine that orchestrates all search algorithms
//! to find the best move in any given position. The search follows a priority pipeline:
//!
//! 0. **Opening book**: Fast early-game responses (center on empty board)
//! 0.5. **Break five**: Break opponent's breakable five via capture
//! 1. **Immediate win**: Check for any move that wins instantly (5-in-a-row or capture)
//! 2. **Block opponent**: Block opponent's immediate winning move
//! 3-4. **VCF**: Victory by Continuous Fours (both sides)
//! 5. **Alpha-Beta**: Full search with iterative deepening and time management
//!
//! # Example
//!
//! ```
//! use gomoku::{AIEngine, Board, Stone, Pos};
//!
//! // Use smaller depth for faster example
//! let mut engine = AIEngine::with_config(8, 4, 500);
//! let mut board = Board::new();
//!
//! // Set up a position with some stones (faster than empty board)
//! board.place_stone(Pos::new(9, 9), Stone::Black);
//!
//! // Get best move for White
//! let result = engine.get_move_with_stats(&board, Stone::White);
//! println!("Best move: {:?}", result.best_move);
//! println!("Search type: {:?}", result.search_type);
//! println!("Time: {}ms", result.time_ms);
//! ```

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::cache::{EvalCache, RootCache};
use crate::config::Config;
use crate::rules::{
    can_break_five_by_capture, execute_captures_fast, find_five_break_moves,
    find_five_line_at_pos, find_five_positions, has_five_at_pos, is_valid_move, undo_captures,
};
use crate::search::{SearchResult, Searcher, ThreatSearcher};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Format a board position as human-readable notation (e.g., "J10")
pub fn pos_to_notation(pos: Pos) -> String {
    // Columns: A=0, B=1, ..., H=7, J=8 (skip I), K=9, ...
    let col_char = if pos.col < 8 {
        (b'A' + pos.col) as char
    } else {
        (b'A' + pos.col + 1) as char // skip 'I'
    };
    // Rows: 1=0, 2=1, ..., 19=18 (board display: bottom=1, top=19)
    format!("{}{}", col_char, pos.row + 1)
}

/// Type of search that produced the result.
///
/// This indicates which phase of the search hierarchy found the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Found immediate winning move (5-in-a-row or capture win)
    ImmediateWin,
    /// Found forced win via Victory by Continuous Fours
    VCF,
    /// Found forced win via Victory by Continuous Threats
    VCT,
    /// Defensive move to block opponent's threat
    Defense,
    /// Regular alpha-beta search result
    AlphaBeta,
}

/// Result of a move search with detailed statistics.
///
/// Contains the best move found along with metadata about the search.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Best move found, if any
    pub best_move: Option<Pos>,
    /// Evaluation score of the position after the move
    pub score: i32,
    /// Type of search that found this move
    pub search_type: SearchType,
    /// Time taken in milliseconds
    pub time_ms: u64,
    /// Number of nodes searched
    pub nodes: u64,
    /// Search depth reached
    pub depth: i8,
    /// Transposition table usage percentage (0-100)
    pub tt_usage: u8,
    /// Nodes per second (kN/s)
    pub nps: u64,
}

impl MoveResult {
    /// Compute nodes per second in kN/s
    fn compute_nps(nodes: u64, time_ms: u64) -> u64 {
        if time_ms == 0 {
            0
        } else {
            nodes * 1000 / time_ms / 1000
        }
    }

    /// Create a result for an immediate win
    #[inline]
    fn immediate_win(pos: Pos, time_ms: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: 1_000_000,
            search_type: SearchType::ImmediateWin,
            time_ms,
            nodes: 1,
            depth: 0,
            tt_usage: 0,
            nps: 0,
        }
    }

    /// Create a result for a VCF win
    #[inline]
    fn vcf_win(pos: Pos, time_ms: u64, nodes: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: 900_000,
            search_type: SearchType::VCF,
            time_ms,
            nodes,
            depth: 0,
            tt_usage: 0,
            nps: Self::compute_nps(nodes, time_ms),
        }
    }

    /// Create a result for a VCT win
    #[inline]
    #[cfg(test)]
    fn vct_win(pos: Pos, time_ms: u64, nodes: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: 800_000,
            search_type: SearchType::VCT,
            time_ms,
            nodes,
            depth: 0,
            tt_usage: 0,
            nps: Self::compute_nps(nodes, time_ms),
        }
    }

    /// Create a result for a defensive move
    #[inline]
    fn defense(pos: Pos, score: i32, time_ms: u64, nodes: u64) -> Self {
        Self {
            best_move: Some(pos),
            score,
            search_type: SearchType::Defense,
            time_ms,
            nodes,
            depth: 0,
            tt_usage: 0,
            nps: 0,
        }
    }

    /// Create a result from alpha-beta search with TT stats
    #[inline]
    fn from_alphabeta(result: SearchResult, time_ms: u64, tt_usage: u8) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            search_type: SearchType::AlphaBeta,
            time_ms,
            nodes: result.nodes,
            depth: result.depth,
            tt_usage,
            nps: Self::compute_nps(result.nodes, time_ms),
        }
    }

    /// Create a quick alpha-beta result (for opening moves)
    #[inline]
    fn alpha_beta(pos: Pos, score: i32, time_ms: u64, nodes: u64) -> Self {
        Self {
            best_move: Some(pos),
            score,
            search_type: SearchType::AlphaBeta,
            time_ms,
            nodes,
            depth: 0,
            tt_usage: 0,
            nps: 0,
        }
    }

    /// Create a result indicating no move found (used in tests)
    #[cfg(test)]
    fn no_move(time_ms: u64) -> Self {
        Self {
            best_move: None,
            score: 0,
            search_type: SearchType::AlphaBeta,
            time_ms,
            nodes: 0,
            depth: 0,
            tt_usage: 0,
            nps: 0,
        }
    }
}

/// Main AI Engine for Gomoku.
///
/// The engine integrates multiple search algorithms with a priority-based
/// approach to find the best move efficiently. It uses:
/// - VCF/VCT threat search for forced wins
/// - Alpha-beta search with transposition table for general positions
/// - Immediate win/loss detection for quick responses
///
/// # Configuration
///
/// The engine can be configured with:
/// - Transposition table size (memory usage)
/// - Maximum search depth
/// - Time limit per move
///
/// # Example
///
/// ```
/// use gomoku::{AIEngine, Board, Stone, Pos};
///
/// // Create engine with custom configuration (smaller depth for doc test)
/// let mut engine = AIEngine::with_config(8, 4, 400);
///
/// let mut board = Board::new();
/// // Add some stones for faster search
/// board.place_stone(Pos::new(9, 9), Stone::Black);
/// if let Some(best_move) = engine.get_move(&board, Stone::White) {
///     println!("Play at ({}, {})", best_move.row, best_move.col);
/// }
/// ```
pub struct AIEngine {
    /// Alpha-beta searcher with transposition table
    searcher: Searcher,
    /// VCF/VCT threat searcher
    threat_searcher: ThreatSearcher,
    /// Maximum search depth for alpha-beta
    max_depth: i8,
    /// Time limit for search in milliseconds
    time_limit_ms: u64,
    /// Depth the searcher always tries to reach before honoring the soft
    /// time budget (see `Config::min_depth`).
    min_depth: i8,
    /// Whole-board evaluation cache, shared with the searcher.
    eval_cache: Arc<EvalCache>,
    /// Root-transpose best-move memo, shared with the searcher.
    root_cache: Arc<RootCache>,
}

impl AIEngine {
    /// Create a new AI engine with default settings.
    ///
    /// Default configuration:
    /// - 64 MB transposition table
    /// - Maximum depth of 20 (iterative deepening stops at time limit)
    /// - 500ms time limit
    ///
    /// # Example
    ///
    /// ```
    /// use gomoku::AIEngine;
    ///
    /// let engine = AIEngine::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(64, 20, 500)
    }

    /// Create an AI engine with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `tt_size_mb` - Transposition table size in megabytes
    /// * `max_depth` - Maximum search depth for alpha-beta
    /// * `time_limit_ms` - Time limit in milliseconds
    ///
    /// # Example
    ///
    /// ```
    /// use gomoku::AIEngine;
    ///
    /// // High-performance configuration
    /// let engine = AIEngine::with_config(128, 14, 500);
    /// ```
    #[must_use]
    pub fn with_config(tt_size_mb: usize, max_depth: i8, time_limit_ms: u64) -> Self {
        let eval_cache = Arc::new(EvalCache::new(1 << 16));
        let root_cache = Arc::new(RootCache::new(1 << 14));
        let searcher = Searcher::new(tt_size_mb)
            .with_eval_cache(Arc::clone(&eval_cache))
            .with_root_cache(Arc::clone(&root_cache));
        Self {
            searcher,
            threat_searcher: ThreatSearcher::with_depths(30, 12),
            max_depth,
            time_limit_ms,
            min_depth: crate::search::alphabeta::DEFAULT_MIN_DEPTH,
            eval_cache,
            root_cache,
        }
    }

    /// Build an engine from a layered [`Config`] (defaults/env/TOML, see
    /// `config.rs`). Scopes the searcher's transposition/eval caches to the
    /// config's `heuristic_hash` so a later weight-table reload can't reuse
    /// stale scores.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let eval_cache = Arc::new(EvalCache::new(config.eval_cache_capacity));
        let root_cache = Arc::new(RootCache::new(config.eval_cache_capacity / 8));
        let mut searcher = Searcher::with_buckets_and_size(config.tt_size_mb, config.tt_buckets)
            .with_eval_cache(Arc::clone(&eval_cache))
            .with_root_cache(Arc::clone(&root_cache));
        searcher.set_heuristic_hash(config.heuristic.heuristic_hash());
        Self {
            searcher,
            threat_searcher: ThreatSearcher::with_depths(30, 12),
            max_depth: config.max_depth,
            time_limit_ms: config.time_budget_ms,
            min_depth: config.min_depth,
            eval_cache,
            root_cache,
        }
    }

    /// Shared handle to the whole-board evaluation cache, for wiring into
    /// [`crate::persistence`] load/flush at process boundaries.
    #[must_use]
    pub fn eval_cache(&self) -> Arc<EvalCache> {
        Arc::clone(&self.eval_cache)
    }

    /// Shared handle to the root-transpose cache, for wiring into
    /// [`crate::persistence`] load/flush at process boundaries.
    #[must_use]
    pub fn root_cache(&self) -> Arc<RootCache> {
        Arc::clone(&self.root_cache)
    }

    /// Shared handle to the transposition table, for wiring into
    /// [`crate::persistence`] load/flush at process boundaries.
    #[must_use]
    pub fn shared_tt(&self) -> Arc<crate::search::TranspositionTable> {
        self.searcher.shared_tt()
    }

    /// Get the best move for the given position.
    ///
    /// This is a convenience method that returns only the best move.
    /// Use `get_move_with_stats` if you need search statistics.
    ///
    /// # Arguments
    ///
    /// * `board` - Current board state
    /// * `color` - Color to move
    ///
    /// # Returns
    ///
    /// The best move found, or `None` if no valid moves exist.
    ///
    /// # Example
    ///
    /// ```
    /// use gomoku::{AIEngine, Board, Stone, Pos};
    ///
    /// // Use smaller depth for faster doc test
    /// let mut engine = AIEngine::with_config(8, 4, 500);
    /// let mut board = Board::new();
    /// board.place_stone(Pos::new(9, 9), Stone::Black);
    ///
    /// if let Some(pos) = engine.get_move(&board, Stone::White) {
    ///     println!("Best move: ({}, {})", pos.row, pos.col);
    /// }
    /// ```
    #[must_use]
    pub fn get_move(&mut self, board: &Board, color: Stone) -> Option<Pos> {
        self.get_move_with_stats(board, color).best_move
    }

    /// Get the best move with detailed search statistics.
    ///
    /// This method performs a full search and returns comprehensive
    /// information about the result, including:
    /// - The best move found
    /// - Evaluation score
    /// - Type of search that found the move
    /// - Time taken
    /// - Number of nodes searched
    ///
    /// # Arguments
    ///
    /// * `board` - Current board state
    /// * `color` - Color to move
    ///
    /// # Returns
    ///
    /// `MoveResult` containing the move and search statistics.
    ///
    /// # Search Priority
    ///
    /// The search follows this priority order:
    /// 1. Immediate winning move (instant)
    /// 2. VCF - forced win via continuous fours
    /// 3. Alpha-beta search (handles offense, defense, and blocking)
    #[must_use]
    pub fn get_move_with_stats(&mut self, board: &Board, color: Stone) -> MoveResult {
        let start = Instant::now();
        // Actual game move number: stones on board + captured stones (removed) + 1
        let total_captured = 2 * (board.captures(Stone::Black) as u32 + board.captures(Stone::White) as u32);
        let move_num = board.stone_count() + total_captured + 1;
        let color_str = if color == Stone::Black { "Black" } else { "White" };

        // Dynamic heuristic phase detection
        let phase_total = board.stone_count()
            + (board.captures(Stone::Black) as u32 + board.captures(Stone::White) as u32) * 2;
        let phase_str = match phase_total {
            0..=10 => "Opening",
            11..=40 => "Midgame",
            _ => "Endgame",
        };

        info!(
            target: "ai::search",
            move_num, color = color_str, stones = board.stone_count(),
            black_captures = board.captures(Stone::Black),
            white_captures = board.captures(Stone::White),
            phase = phase_str,
            "move search starting"
        );

        // 0. Opening book for fast early game response
        if let Some(opening_move) = self.get_opening_move(board, color) {
            debug!(target: "ai::search", stage = 0, move_pos = %pos_to_notation(opening_move), "opening book");
            return MoveResult::alpha_beta(
                opening_move,
                0,
                start.elapsed().as_millis() as u64,
                1,
            );
        }

        // 0.5: Check if opponent has an existing breakable five — MUST break it NOW
        // In Ninuki-renju, a breakable five gives opponent ONE chance to capture.
        // If they fail, the five-holder wins. This is a forced response.
        let opponent = color.opponent();
        if let Some(opp_five) = find_five_positions(board, opponent, BOARD_SIZE as u8) {
            if can_break_five_by_capture(board, &opp_five, opponent, BOARD_SIZE as u8) {
                let break_moves = find_five_break_moves(board, &opp_five, opponent, BOARD_SIZE as u8);
                let valid_breaks: Vec<Pos> = break_moves
                    .into_iter()
                    .filter(|&p| is_valid_move(board, p, color, BOARD_SIZE as u8))
                    .collect();
                let break_strs: Vec<String> =
                    valid_breaks.iter().map(|p| pos_to_notation(*p)).collect();
                debug!(target: "ai::search", stage = 0.5, breaks = %break_strs.join(", "), "opponent five exists");
                if valid_breaks.len() == 1 {
                    // Check if the single break allows opponent to recreate an UNBREAKABLE five
                    let brk = valid_breaks[0];
                    let mut test_board = board.clone();
                    test_board.place_stone(brk, color);
                    let cap_info = execute_captures_fast(&mut test_board, brk, color);
                    let mut recreates_unbreakable = false;
                    for i in 0..cap_info.count as usize {
                        let cap_pos = cap_info.positions[i];
                        test_board.place_stone(cap_pos, opponent);
                        if has_five_at_pos(&test_board, cap_pos, opponent, BOARD_SIZE as u8) {
                            // Recreation possible — check if recreated five is unbreakable
                            if let Some(new_five) =
                                find_five_line_at_pos(&test_board, cap_pos, opponent, BOARD_SIZE as u8)
                            {
                                if !can_break_five_by_capture(&test_board, &new_five, opponent, BOARD_SIZE as u8) {
                                    recreates_unbreakable = true;
                                }
                            }
                        }
                        test_board.remove_stone(cap_pos);
                        if recreates_unbreakable {
                            break;
                        }
                    }
                    if recreates_unbreakable {
                        debug!(target: "ai::search", move_pos = %pos_to_notation(brk), "forced break rejected: opponent recreates unbreakable five");
                        // Fall through to alpha-beta for a strategic alternative
                    } else {
                        info!(target: "ai::search", stage = 0.5, move_pos = %pos_to_notation(brk), "forced break");
                        return MoveResult::defense(
                            brk,
                            -900_000,
                            start.elapsed().as_millis() as u64,
                            1,
                        );
                    }
                } else if valid_breaks.is_empty() {
                    warn!(target: "ai::search", stage = 0.5, "no valid break moves, opponent wins");
                    // Fall through to alpha-beta for best losing move
                } else {
                    // Multiple break moves: evaluate each with quick search
                    // to pick the best position after breaking.
                    // IMPORTANT: Check if opponent can recreate the five by replaying
                    // at a captured position. If so, the break leads to an infinite
                    // loop (AI breaks → opponent replays → AI breaks → ...).
                    // Only accept breaks where recreation is impossible.
                    let mut best_move = valid_breaks[0];
                    let mut best_score = i32::MIN;
                    let mut any_safe_break = false;
                    let mut test_board = board.clone();
                    for &brk in &valid_breaks {
                        test_board.place_stone(brk, color);
                        let cap_info = execute_captures_fast(&mut test_board, brk, color);

                        // Check if opponent can recreate an UNBREAKABLE five
                        // Breakable recreation (cycle) is acceptable — White must break anyway
                        let mut recreates_unbreakable = false;
                        for i in 0..cap_info.count as usize {
                            let cap_pos = cap_info.positions[i];
                            test_board.place_stone(cap_pos, opponent);
                            if has_five_at_pos(&test_board, cap_pos, opponent, BOARD_SIZE as u8) {
                                if let Some(new_five) =
                                    find_five_line_at_pos(&test_board, cap_pos, opponent, BOARD_SIZE as u8)
                                {
                                    if !can_break_five_by_capture(
                                        &test_board,
                                        &new_five,
                                        opponent,
                                        BOARD_SIZE as u8,
                                    ) {
                                        recreates_unbreakable = true;
                                    }
                                }
                            }
                            test_board.remove_stone(cap_pos);
                            if recreates_unbreakable {
                                break;
                            }
                        }

                        if !recreates_unbreakable {
                            let score = crate::eval::evaluate(&test_board, color);
                            if score > best_score || !any_safe_break {
                                best_score = score;
                                best_move = brk;
                            }
                            any_safe_break = true;
                        } else {
                            debug!(target: "ai::search", move_pos = %pos_to_notation(brk), "break rejected: opponent recreates unbreakable five");
                        }

                        undo_captures(&mut test_board, color, &cap_info);
                        test_board.remove_stone(brk);
                    }
                    if any_safe_break {
                        info!(target: "ai::search", stage = 0.5, move_pos = %pos_to_notation(best_move), eval = best_score, "best break");
                        return MoveResult::defense(
                            best_move,
                            -900_000,
                            start.elapsed().as_millis() as u64,
                            valid_breaks.len() as u64,
                        );
                    }
                    debug!(target: "ai::search", stage = 0.5, "all breaks lead to unbreakable recreation, falling through to alpha-beta");
                    // Fall through to alpha-beta for best strategic move
                }
            } else {
                // Opponent's five is unbreakable — game should have already ended
                warn!(target: "ai::search", stage = 0.5, "opponent has unbreakable five");
            }
        }

        // 1. Check for immediate winning move (5-in-a-row or capture win)
        if let Some(win_move) = self.find_immediate_win(board, color) {
            info!(target: "ai::search", stage = 1, move_pos = %pos_to_notation(win_move), "immediate win");
            return MoveResult::immediate_win(win_move, start.elapsed().as_millis() as u64);
        }

        // 2. Check if opponent can win immediately - MUST block
        let opponent_threats = self.find_winning_moves(board, opponent);
        debug!(
            target: "ai::search", stage = 2, threat_count = opponent_threats.len(),
            threats = %opponent_threats.iter().map(|p| pos_to_notation(*p)).collect::<Vec<_>>().join(", "),
            "opponent threats"
        );
        if opponent_threats.len() == 1 {
            let block_pos = opponent_threats[0];
            if is_valid_move(board, block_pos, color, BOARD_SIZE as u8) {
                info!(target: "ai::search", move_pos = %pos_to_notation(block_pos), "defense: block immediate");
                return MoveResult::defense(
                    block_pos,
                    -900_000,
                    start.elapsed().as_millis() as u64,
                    1,
                );
            }
        } else if opponent_threats.len() >= 2 {
            warn!(target: "ai::search", threat_count = opponent_threats.len(), "opponent has open four, likely lost");
        }

        // 3. Search VCF (Victory by Continuous Fours) - our forced win
        // Skip VCF when opponent has 4+ captures: one more capture = instant win,
        // so VCF is unreliable (opponent can ignore fours and capture instead).
        // At 3 captures, find_defense_moves includes strategic captures as defenses,
        // so VCF is still usable. At 4, too dangerous — let alpha-beta handle it.
        let opp_captures = board.captures(opponent);
        let vcf_reliable = opp_captures < 4;
        if vcf_reliable {
            let vcf_result = self.threat_searcher.search_vcf(board, color);
            if vcf_result.found && !vcf_result.winning_sequence.is_empty() {
                let seq: Vec<String> = vcf_result.winning_sequence.iter().map(|p| pos_to_notation(*p)).collect();
                info!(target: "ai::search", stage = 3, sequence = %seq.join(" -> "), "our vcf found");
                return MoveResult::vcf_win(
                    vcf_result.winning_sequence[0],
                    start.elapsed().as_millis() as u64,
                    self.threat_searcher.nodes(),
                );
            }
            debug!(target: "ai::search", stage = 3, nodes = self.threat_searcher.nodes(), "our vcf: not found");
        } else {
            debug!(target: "ai::search", stage = 3, opp_captures, "vcf skipped: opponent captures unreliable");
        }

        // 4. Check opponent VCF - if opponent has a forced win, we must block
        // Skip when WE have 4+ captures (opponent's VCF is unreliable — we can capture)
        let our_captures = board.captures(color);
        let opp_vcf_reliable = our_captures < 4;
        if opp_vcf_reliable {
            let opp_vcf = self.threat_searcher.search_vcf(board, opponent);
            if opp_vcf.found && !opp_vcf.winning_sequence.is_empty() {
                let seq: Vec<String> = opp_vcf.winning_sequence.iter().map(|p| pos_to_notation(*p)).collect();
                info!(target: "ai::search", stage = 4, sequence = %seq.join(" -> "), "opponent vcf found");
                let block_pos = opp_vcf.winning_sequence[0];
                if is_valid_move(board, block_pos, color, BOARD_SIZE as u8) {
                    info!(target: "ai::search", move_pos = %pos_to_notation(block_pos), "defense: block vcf");
                    return MoveResult::defense(
                        block_pos,
                        -800_000,
                        start.elapsed().as_millis() as u64,
                        self.threat_searcher.nodes(),
                    );
                }
            }
            debug!(target: "ai::search", stage = 4, nodes = self.threat_searcher.nodes(), "opponent vcf: not found");
        } else {
            debug!(target: "ai::search", stage = 4, our_captures, "opponent vcf skipped: we can counter");
        }

        // NOTE: VCT removed from authoritative pipeline.
        // Open-three threats are NOT forcing — opponent can ignore and counter-attack.
        // Alpha-beta with threat extensions handles tactical sequences correctly.
        // VCF remains sound when capture counts are low.

        // 5. Alpha-Beta search handles ALL strategy
        // Adaptive time: allocate more time for critical mid-game, less for
        // opening (simple) and late-game (narrow trees).
        let adaptive_time = self.compute_time_limit(board);
        let result = self.searcher.search_timed_with(
            board,
            color,
            self.max_depth,
            adaptive_time,
            self.min_depth.min(self.max_depth),
            None,
        );
        let tt_usage = self.searcher.tt_stats().usage_percent;
        let elapsed = start.elapsed().as_millis() as u64;

        info!(
            target: "ai::search",
            stage = 5,
            move_pos = %result.best_move.map(pos_to_notation).unwrap_or_else(|| "none".to_string()),
            score = result.score,
            depth = result.depth,
            nodes = result.nodes,
            elapsed_ms = elapsed,
            nps_k = MoveResult::compute_nps(result.nodes, elapsed),
            tt_usage_pct = tt_usage,
            "alpha-beta search complete"
        );

        MoveResult::from_alphabeta(result, elapsed, tt_usage)
    }

    /// Compute adaptive time limit based on game phase.
    ///
    /// Only reduces time in the opening where positions are simple and
    /// deep search isn't critical. Mid-game and beyond get full time
    /// to maintain search depth and playing strength.
    fn compute_time_limit(&self, board: &Board) -> u64 {
        let stones = board.stone_count();

        // Only reduce time in opening — mid-game needs full depth
        let pct = match stones {
            0..=2 => 30,      // Very early: center/adjacent, trivial
            3..=4 => 60,      // Opening: still simple positions
            _ => 100,         // Mid-game+: full time for deep search
        };

        // Apply percentage with minimum floor of 300ms
        (self.time_limit_ms * pct / 100).max(300)
    }

    /// Find ALL positions where `color` can win immediately.
    ///
    /// Returns a list of winning positions (usually 1 for closed four, 2 for open four).
    /// Used to detect opponent threats that must be blocked.
    /// Uses make/unmake pattern with fast has_five_at_pos check.
    fn find_winning_moves(&self, board: &Board, color: Stone) -> Vec<Pos> {
        let mut wins = Vec::new();
        let near_capture_win = board.captures(color) >= 4;
        let mut test_board = board.clone();

        for r in 0..BOARD_SIZE as u8 {
            for c in 0..BOARD_SIZE as u8 {
                let pos = Pos::new(r, c);
                if !is_valid_move(board, pos, color, BOARD_SIZE as u8) {
                    continue;
                }

                // Make move
                test_board.place_stone(pos, color);
                let cap_info = execute_captures_fast(&mut test_board, pos, color);

                // Fast five-in-a-row check (O(4 directions) vs O(all_stones * 4))
                if has_five_at_pos(&test_board, pos, color, BOARD_SIZE as u8) {
                    // Only count as win if opponent can't break it by capture
                    if let Some(five) = find_five_positions(&test_board, color, BOARD_SIZE as u8) {
                        if !can_break_five_by_capture(&test_board, &five, color, BOARD_SIZE as u8) {
                            wins.push(pos);
                        }
                    }
                }

                // Capture win check
                if near_capture_win && test_board.captures(color) >= 5 && !wins.contains(&pos) {
                    wins.push(pos);
                }

                // Unmake move
                undo_captures(&mut test_board, color, &cap_info);
                test_board.remove_stone(pos);
            }
        }
        wins
    }

    /// Find an immediate winning move.
    ///
    /// Checks for moves that win instantly via:
    /// - 5-in-a-row (using fast has_five_at_pos)
    /// - Capturing the 5th pair (10 total stones)
    /// Uses make/unmake pattern to avoid cloning per position.
    fn find_immediate_win(&self, board: &Board, color: Stone) -> Option<Pos> {
        let near_capture_win = board.captures(color) >= 4;
        let mut test_board = board.clone();

        for r in 0..BOARD_SIZE as u8 {
            for c in 0..BOARD_SIZE as u8 {
                let pos = Pos::new(r, c);
                if !is_valid_move(board, pos, color, BOARD_SIZE as u8) {
                    continue;
                }

                // Make move
                test_board.place_stone(pos, color);
                let cap_info = execute_captures_fast(&mut test_board, pos, color);

                // Check five-in-a-row (fast, O(4 directions))
                if has_five_at_pos(&test_board, pos, color, BOARD_SIZE as u8) {
                    if let Some(five) = find_five_positions(&test_board, color, BOARD_SIZE as u8) {
                        if !can_break_five_by_capture(&test_board, &five, color, BOARD_SIZE as u8) {
                            // Unbreakable five → immediate win
                            return Some(pos);
                        }
                        // Five is STATICALLY breakable. Check if all breaks are illusory
                        // (break captures a bracket stone, so replay creates unbreakable five).
                        if Self::is_illusory_break(&test_board, &five, color) {
                            return Some(pos);
                        }
                    }
                }

                // Check capture win
                if near_capture_win && test_board.captures(color) >= 5 {
                    return Some(pos);
                }

                // Unmake move
                undo_captures(&mut test_board, color, &cap_info);
                test_board.remove_stone(pos);
            }
        }
        None
    }

    /// Check if all break captures on a five are illusory.
    ///
    /// A break is "illusory" when:
    /// 1. The break capture removes a five-stone AND a bracket stone
    /// 2. The five-holder replays the captured five-stone
    /// 3. The recreated five is unbreakable (bracket stone gone)
    ///
    /// If ALL break moves are illusory, the five is effectively unbreakable
    /// and counts as an immediate win (forced 3-ply sequence).
    fn is_illusory_break(board: &Board, five_positions: &[Pos], five_color: Stone) -> bool {
        let opponent = five_color.opponent();
        let break_moves = find_five_break_moves(board, five_positions, five_color, BOARD_SIZE as u8);

        if break_moves.is_empty() {
            return false;
        }

        for &break_pos in &break_moves {
            // Simulate opponent's break capture
            let mut sim = board.clone();
            sim.place_stone(break_pos, opponent);
            let cap_info = execute_captures_fast(&mut sim, break_pos, opponent);

            // Find which five stones were captured
            let mut captured_five_stone = None;
            let mut captured_five_count = 0;
            for i in 0..cap_info.count as usize {
                if five_positions.contains(&cap_info.positions[i]) {
                    captured_five_stone = Some(cap_info.positions[i]);
                    captured_five_count += 1;
                }
            }

            // If two or more five stones captured, can't recreate with one replay
            if captured_five_count >= 2 {
                return false;
            }

            let replay_pos = match captured_five_stone {
                Some(p) => p,
                None => return false, // Break doesn't hit five stones (shouldn't happen)
            };

            // Position must be empty after capture (it was just captured)
            if !sim.is_empty(replay_pos) {
                return false;
            }

            // Simulate replay
            sim.place_stone(replay_pos, five_color);

            // Check if five is recreated at replay position
            if !has_five_at_pos(&sim, replay_pos, five_color, BOARD_SIZE as u8) {
                return false;
            }

            // Check if recreated five is now unbreakable
            if let Some(new_five) = find_five_line_at_pos(&sim, replay_pos, five_color, BOARD_SIZE as u8) {
                if can_break_five_by_capture(&sim, &new_five, five_color, BOARD_SIZE as u8) {
                    return false; // Recreated five is still breakable → genuine break
                }
            } else {
                return false;
            }
        }

        true // All breaks are illusory → effectively unbreakable
    }

    /// Set the maximum search depth for alpha-beta.
    ///
    /// Higher depths give stronger play but take longer.
    /// Recommended range: 8-14
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum search depth
    pub fn set_max_depth(&mut self, depth: i8) {
        self.max_depth = depth;
    }

    /// Set the time limit for alpha-beta search (milliseconds).
    /// The search uses iterative deepening with soft/hard limits derived from this value.
    ///
    /// # Arguments
    ///
    /// * `time_ms` - Time limit in milliseconds
    pub fn set_time_limit(&mut self, time_ms: u64) {
        self.time_limit_ms = time_ms;
    }

    /// Clear the transposition table, eval cache, and root cache.
    ///
    /// Call this when starting a new game to avoid stale positions.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
        self.searcher.clear_history();
        self.eval_cache.clear();
        self.root_cache.clear();
    }

    /// Get the current maximum search depth.
    #[must_use]
    pub fn max_depth(&self) -> i8 {
        self.max_depth
    }

    /// Get transposition table statistics.
    #[must_use]
    pub fn tt_stats(&self) -> crate::search::TTStats {
        self.searcher.tt_stats()
    }

    /// Get an opening book move for the first 1-2 moves.
    ///
    /// - Empty board: play center (9,9)
    /// - One opponent stone: play diagonally adjacent, preferring center-ward
    ///
    /// Standard Gomoku opening theory: the second move should be placed
    /// adjacent to the opponent's stone to contest territory and start
    /// building connected patterns. Diagonal placement is strongest because
    /// it creates potential in two diagonal directions simultaneously.
    pub(crate) fn get_opening_move(&self, board: &Board, color: Stone) -> Option<Pos> {
        // Empty board → center is universally optimal
        if board.stone_count() == 0 {
            return Some(Pos::new(9, 9));
        }
        // Second move: play diagonally adjacent to opponent's only stone
        if board.stone_count() == 1 {
            let opponent = color.opponent();
            // Find the opponent's stone
            if let Some(stones) = board.stones(opponent) {
                if let Some(opp_pos) = stones.iter_ones().next() {
                    let center = (BOARD_SIZE / 2) as i32;
                    let diagonals: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
                    let mut best: Option<Pos> = None;
                    let mut best_dist = i32::MAX;
                    for (dr, dc) in diagonals {
                        let nr = i32::from(opp_pos.row) + dr;
                        let nc = i32::from(opp_pos.col) + dc;
                        if Pos::is_valid(nr, nc) {
                            let dist = (nr - center).abs() + (nc - center).abs();
                            if dist < best_dist {
                                best_dist = dist;
                                #[allow(clippy::cast_sign_loss)]
                                {
                                    best = Some(Pos::new(nr as u8, nc as u8));
                                }
                            }
                        }
                    }
                    return best;
                }
            }
        }
        // Third move: our 2nd stone as second player (opponent has 2 stones)
        // Only use book for same-row or same-column opponent pairs (well-tested).
        // Diagonal pairs and other patterns fall through to alpha-beta search.
        if board.stone_count() == 3 {
            let opponent = color.opponent();
            if let (Some(my_bb), Some(opp_bb)) = (board.stones(color), board.stones(opponent)) {
                let mut my_iter = my_bb.iter_ones();
                let mut opp_iter = opp_bb.iter_ones();
                if let (Some(my_pos), Some(opp1), Some(opp2)) =
                    (my_iter.next(), opp_iter.next(), opp_iter.next())
                {
                    let same_row = opp1.row == opp2.row;
                    let same_col = opp1.col == opp2.col;
                    if my_iter.next().is_none()
                        && opp_iter.next().is_none()
                        && (same_row || same_col)
                    {
                        let center = (BOARD_SIZE / 2) as i32;
                        let diags: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
                        let opp_stones = [opp1, opp2];

                        let mut best: Option<Pos> = None;
                        let mut best_score = i32::MIN;

                        for &opp_pos in &opp_stones {
                            for &(dr, dc) in &diags {
                                let nr = i32::from(opp_pos.row) + dr;
                                let nc = i32::from(opp_pos.col) + dc;
                                if !Pos::is_valid(nr, nc) { continue; }
                                #[allow(clippy::cast_sign_loss)]
                                let p = Pos::new(nr as u8, nc as u8);
                                if board.get(p) != Stone::Empty { continue; }

                                let center_dist =
                                    (nr - center).abs() + (nc - center).abs();
                                // Bonus: on same row/column as our stone (connectivity)
                                let connectivity = if nr == i32::from(my_pos.row)
                                    || nc == i32::from(my_pos.col)
                                { 10 } else { 0 };
                                // Bonus: diagonal-adjacent to BOTH opponent stones
                                let multi_disrupt = opp_stones
                                    .iter()
                                    .filter(|op| {
                                        (i32::from(op.row) - nr).abs() == 1
                                            && (i32::from(op.col) - nc).abs() == 1
                                    })
                                    .count() as i32
                                    * 5;

                                let score = 100 - center_dist * 15
                                    + connectivity + multi_disrupt;
                                if score > best_score {
                                    best_score = score;
                                    best = Some(p);
                                }
                            }
                        }
                        return best;
                    }
                }
            }
        }
        // Everything else goes through full search pipeline
        None
    }
}

impl Default for AIEngine {
    fn default() -> Self {
        Self::new()
    }
}
