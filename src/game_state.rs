//! Game-level state: the board plus everything a search call needs to know
//! about the position that isn't captured by a raw `Board`.
//!
//! The teacher's `AIEngine` takes a bare `(&Board, Stone)` pair everywhere
//! and recomputes move numbers, capture counts, and forbidden-move status
//! ad hoc at each call site. `GameState` is the single owner of that
//! derived state — hash, status, whose move it is, the active playable
//! sub-square — generalized from the teacher's fixed 19x19/Black-starts
//! assumptions to the range of board sizes and rule variants `Rules` now
//! allows.

use crate::board::{Board, Pos, Stone, BOARD_SIZE};
use crate::rules::{
    can_break_five_by_capture, check_winner, execute_captures_fast, find_five_break_moves,
    find_five_positions, is_forbidden_for_color, is_valid_move, undo_captures, CaptureInfo,
};
use crate::zobrist::ZobristTable;

/// A move a player can make. `(row, col)` with `row, col` in `[0, active_size)`.
/// There is no sentinel "none" move in this representation — absence is
/// `Option<Move>` at the type level instead of an in-band `(-1, -1)`.
pub type Move = Pos;

/// Outcome of a game, as tracked incrementally by [`GameState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    NotStarted,
    Running,
    BlackWon,
    WhiteWon,
    Draw,
}

impl Status {
    #[must_use]
    pub fn is_over(self) -> bool {
        !matches!(self, Status::NotStarted | Status::Running)
    }
}

/// Immutable ruleset a [`GameState`] is played under. See `rules::forbidden`
/// for the per-color double-three gate and `rules::capture` for the pair
/// target.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    /// Side length of the square playable region; always `<= BOARD_SIZE`.
    pub board_size: u8,
    /// Stones in a row required to win (almost always 5).
    pub win_length: u8,
    /// Captured pairs required for a capture win (almost always 5, i.e. 10 stones).
    pub capture_win_pairs: u8,
    pub forbid_double_three_black: bool,
    pub forbid_double_three_white: bool,
    pub black_starts: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE as u8,
            win_length: 5,
            capture_win_pairs: 5,
            forbid_double_three_black: true,
            forbid_double_three_white: false,
            black_starts: true,
        }
    }
}

/// Reason a candidate move fails [`is_legal`]. Mirrors the four failure
/// modes the rules module documents for move legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    OutOfBounds,
    MustCapture,
    Occupied,
    ForbiddenDoubleThree,
}

impl IllegalReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IllegalReason::OutOfBounds => "out of bounds",
            IllegalReason::MustCapture => "must capture",
            IllegalReason::Occupied => "occupied",
            IllegalReason::ForbiddenDoubleThree => "forbidden double three",
        }
    }
}

/// Record needed to exactly reverse one [`GameState::apply`] call.
#[derive(Debug, Clone)]
pub struct Undo {
    pos: Pos,
    stone: Stone,
    captures: CaptureInfo,
    prev_status: Status,
    prev_to_move: Stone,
    prev_hash: u64,
    prev_has_last_move: bool,
    prev_last_move: Pos,
    prev_must_capture: bool,
    prev_forced_capture_moves: Vec<Pos>,
    prev_winning_line: Vec<Pos>,
}

/// A Gomoku/Ninuki-renju position: the board, whose move it is, the running
/// Zobrist hash, and the game's outcome so far.
///
/// `active_size` restricts legal-move iteration to an `active_size x
/// active_size` sub-square of the fixed 19x19 storage (see DESIGN.md's
/// board-size-generalization decision) — the underlying `Board`/`Bitboard`
/// is always full-size, only the rules scan a smaller window.
#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub to_move: Stone,
    pub status: Status,
    pub has_last_move: bool,
    pub last_move: Pos,
    pub rules: Rules,
    /// True when the stone `to_move` just faced a breakable five-in-a-row
    /// from its opponent and the opponent's win hasn't been finalized — the
    /// only legal replies left are [`Self::forced_capture_moves`] (§4.1's
    /// endgame capture rule; see `rules::win::can_break_five_by_capture`).
    pub must_capture: bool,
    /// Non-empty exactly when `must_capture`; the capturing moves that
    /// break the five threatening `to_move`.
    pub forced_capture_moves: Vec<Pos>,
    /// The five-in-a-row that ended the game, when `status` is `BlackWon`
    /// or `WhiteWon` by alignment. Empty for a capture-count win or a game
    /// still running.
    pub winning_line: Vec<Pos>,
    hash: u64,
}

impl GameState {
    /// A fresh game under `rules`. `to_move` starts as Black unless
    /// `rules.black_starts` is false.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        let board = Board::new();
        let to_move = if rules.black_starts { Stone::Black } else { Stone::White };
        let zobrist = ZobristTable::new();
        let hash = zobrist.hash(&board, to_move);
        Self {
            board,
            to_move,
            status: Status::NotStarted,
            has_last_move: false,
            last_move: Pos::new(0, 0),
            rules,
            must_capture: false,
            forced_capture_moves: Vec::new(),
            winning_line: Vec::new(),
            hash,
        }
    }

    #[must_use]
    pub fn active_size(&self) -> u8 {
        self.rules.board_size
    }

    /// True if `pos` lies within the active playable sub-square (see
    /// DESIGN.md's board-size-generalization decision).
    #[must_use]
    pub fn in_active_region(&self, pos: Pos) -> bool {
        (pos.row as u8) < self.active_size() && (pos.col as u8) < self.active_size()
    }

    #[must_use]
    pub fn hash(&self, zobrist: &ZobristTable) -> u64 {
        zobrist.hash(&self.board, self.to_move)
    }

    /// Cached incremental hash, valid only if every mutation went through
    /// [`GameState::apply`]/[`GameState::undo`].
    #[must_use]
    pub fn incremental_hash(&self) -> u64 {
        self.hash
    }

    /// Apply a move for `self.to_move`, updating hash, captures, status,
    /// and last-move bookkeeping. Returns an [`Undo`] token that
    /// [`GameState::undo`] can replay to restore the prior state exactly.
    ///
    /// Does not check legality — callers are expected to have validated
    /// the move via `rules::is_valid_move` first, matching the teacher's
    /// make/unmake discipline in `search/alphabeta.rs`.
    pub fn apply(&mut self, zobrist: &ZobristTable, pos: Pos) -> Undo {
        let stone = self.to_move;
        let prev_status = self.status;
        let prev_to_move = self.to_move;
        let prev_hash = self.hash;
        let prev_has_last_move = self.has_last_move;
        let prev_last_move = self.last_move;
        let prev_must_capture = self.must_capture;
        let prev_forced_capture_moves = self.forced_capture_moves.clone();
        let prev_winning_line = self.winning_line.clone();

        self.board.place_stone(pos, stone);
        let mut hash = zobrist.update_place(self.hash, pos, stone);

        let captures = execute_captures_fast(&mut self.board, pos, stone);
        for i in 0..captures.count as usize {
            hash = zobrist.update_capture(hash, captures.positions[i], stone.opponent());
        }
        if captures.pairs() > 0 {
            let new_count = self.board.captures(stone);
            let old_count = new_count - captures.pairs();
            hash = zobrist.update_capture_count(hash, stone, old_count, new_count);
        }

        self.hash = hash;
        self.has_last_move = true;
        self.last_move = pos;

        self.status = self.compute_status(pos, stone);
        self.winning_line = self.compute_winning_line();
        // `to_move` still advances even once the game is over; callers check
        // `status.is_over()` rather than relying on `to_move` to stop play.
        self.to_move = stone.opponent();
        let (must_capture, forced_capture_moves) = self.compute_forced_capture(stone);
        self.must_capture = must_capture;
        self.forced_capture_moves = forced_capture_moves;

        Undo {
            pos,
            stone,
            captures,
            prev_status,
            prev_to_move,
            prev_hash,
            prev_has_last_move,
            prev_last_move,
            prev_must_capture,
            prev_forced_capture_moves,
            prev_winning_line,
        }
    }

    /// Reverse the effect of [`GameState::apply`] using the token it returned.
    pub fn undo(&mut self, undo: &Undo) {
        undo_captures(&mut self.board, undo.stone, &undo.captures);
        self.board.remove_stone(undo.pos);

        self.status = undo.prev_status;
        self.to_move = undo.prev_to_move;
        self.hash = undo.prev_hash;
        self.has_last_move = undo.prev_has_last_move;
        self.last_move = undo.prev_last_move;
        self.must_capture = undo.prev_must_capture;
        self.forced_capture_moves = undo.prev_forced_capture_moves.clone();
        self.winning_line = undo.prev_winning_line.clone();
    }

    fn compute_status(&self, _last_move: Pos, _mover: Stone) -> Status {
        match check_winner(&self.board, self.active_size()) {
            Some(Stone::Black) => return Status::BlackWon,
            Some(Stone::White) => return Status::WhiteWon,
            _ => {}
        }
        if self.board.stone_count() as usize >= (self.active_size() as usize) * (self.active_size() as usize) {
            return Status::Draw;
        }
        Status::Running
    }

    /// The alignment that ended the game, if `self.status` is a win by
    /// five-in-a-row. Empty for a capture-count win, draw, or running game.
    fn compute_winning_line(&self) -> Vec<Pos> {
        let winner = match self.status {
            Status::BlackWon => Stone::Black,
            Status::WhiteWon => Stone::White,
            _ => return Vec::new(),
        };
        find_five_positions(&self.board, winner, self.active_size()).unwrap_or_default()
    }

    /// After `last_mover` just moved, check whether it left a breakable
    /// five-in-a-row on the board — `check_winner` doesn't end the game for
    /// a breakable five (§4.1's endgame capture rule), so the opponent
    /// (now `self.to_move`) gets exactly one move to break it. Only
    /// meaningful while `status == Running`.
    fn compute_forced_capture(&self, last_mover: Stone) -> (bool, Vec<Pos>) {
        if self.status != Status::Running {
            return (false, Vec::new());
        }
        let active_size = self.active_size();
        let Some(five) = find_five_positions(&self.board, last_mover, active_size) else {
            return (false, Vec::new());
        };
        if !can_break_five_by_capture(&self.board, &five, last_mover, active_size) {
            return (false, Vec::new());
        }
        let breaks: Vec<Pos> = find_five_break_moves(&self.board, &five, last_mover, active_size)
            .into_iter()
            .filter(|&p| is_valid_move(&self.board, p, last_mover.opponent(), active_size))
            .collect();
        (!breaks.is_empty(), breaks)
    }
}

/// `is_legal(state, move, player) → (ok, reason)` per §4.1: fails with
/// `OutOfBounds`, `MustCapture`, `Occupied`, or `ForbiddenDoubleThree`.
/// When `state.must_capture` and `player == state.to_move`, only moves in
/// `state.forced_capture_moves` pass.
#[must_use]
pub fn is_legal(state: &GameState, mv: Pos, player: Stone) -> (bool, Option<IllegalReason>) {
    if !state.in_active_region(mv) {
        return (false, Some(IllegalReason::OutOfBounds));
    }
    if state.must_capture && player == state.to_move && !state.forced_capture_moves.contains(&mv) {
        return (false, Some(IllegalReason::MustCapture));
    }
    if !state.board.is_empty(mv) {
        return (false, Some(IllegalReason::Occupied));
    }
    if is_forbidden_for_color(
        &state.board,
        mv,
        player,
        state.rules.forbid_double_three_black,
        state.rules.forbid_double_three_white,
        state.active_size(),
    ) {
        return (false, Some(IllegalReason::ForbiddenDoubleThree));
    }
    (true, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_black_starts_running_after_first_move() {
        let mut state = GameState::new(Rules::default());
        assert_eq!(state.status, Status::NotStarted);
        assert_eq!(state.to_move, Stone::Black);

        let zobrist = ZobristTable::new();
        let undo = state.apply(&zobrist, Pos::new(9, 9));
        assert_eq!(state.status, Status::Running);
        assert_eq!(state.to_move, Stone::White);
        assert!(state.has_last_move);
        assert_eq!(state.last_move, Pos::new(9, 9));

        state.undo(&undo);
        assert_eq!(state.status, Status::NotStarted);
        assert_eq!(state.to_move, Stone::Black);
        assert!(!state.has_last_move);
        assert!(state.board.is_board_empty());
    }

    #[test]
    fn test_apply_detects_five_in_a_row_win() {
        let mut state = GameState::new(Rules::default());
        let zobrist = ZobristTable::new();
        for i in 0..4 {
            state.apply(&zobrist, Pos::new(9, i));
            state.apply(&zobrist, Pos::new(0, i));
        }
        let undo = state.apply(&zobrist, Pos::new(9, 4));
        assert_eq!(state.status, Status::BlackWon);
        state.undo(&undo);
        assert_eq!(state.status, Status::Running);
    }

    #[test]
    fn test_undo_restores_hash_exactly() {
        let mut state = GameState::new(Rules::default());
        let zobrist = ZobristTable::new();
        let hash_before = state.incremental_hash();

        let undo = state.apply(&zobrist, Pos::new(5, 5));
        assert_ne!(state.incremental_hash(), hash_before);

        state.undo(&undo);
        assert_eq!(state.incremental_hash(), hash_before);
    }

    #[test]
    fn test_in_active_region_respects_smaller_board_size() {
        let rules = Rules { board_size: 9, ..Rules::default() };
        let state = GameState::new(rules);
        assert!(state.in_active_region(Pos::new(8, 8)));
        assert!(!state.in_active_region(Pos::new(9, 9)));
    }

    #[test]
    fn test_winning_line_populated_on_alignment_win() {
        let mut state = GameState::new(Rules::default());
        let zobrist = ZobristTable::new();
        for i in 0..4 {
            state.apply(&zobrist, Pos::new(9, i));
            state.apply(&zobrist, Pos::new(0, i));
        }
        state.apply(&zobrist, Pos::new(9, 4));
        assert_eq!(state.status, Status::BlackWon);
        assert_eq!(state.winning_line.len(), 5);
        for i in 0..5 {
            assert!(state.winning_line.contains(&Pos::new(9, i)));
        }
    }

    #[test]
    fn test_breakable_five_sets_must_capture_instead_of_ending_game() {
        // Same breakable-five fixture `engine.rs` uses to prove White must
        // play the break: Black has a five at K10/J10/K11/L12/M13/H9 that
        // White can break by capture.
        let mut state = GameState::new(Rules::default());
        state.board.place_stone(Pos::new(9, 9), Stone::Black);
        state.board.place_stone(Pos::new(10, 8), Stone::Black);
        state.board.place_stone(Pos::new(8, 7), Stone::Black);
        state.board.place_stone(Pos::new(11, 7), Stone::Black);
        state.board.place_stone(Pos::new(9, 7), Stone::Black);
        state.board.place_stone(Pos::new(9, 8), Stone::Black);
        state.board.place_stone(Pos::new(9, 6), Stone::Black);
        state.board.place_stone(Pos::new(10, 9), Stone::Black);
        state.board.place_stone(Pos::new(11, 10), Stone::Black);
        state.board.place_stone(Pos::new(12, 11), Stone::Black);

        state.board.place_stone(Pos::new(5, 7), Stone::White);
        state.board.place_stone(Pos::new(10, 12), Stone::White);
        state.board.place_stone(Pos::new(7, 11), Stone::White);
        state.board.place_stone(Pos::new(8, 9), Stone::White);
        state.board.place_stone(Pos::new(12, 6), Stone::White);
        state.board.place_stone(Pos::new(10, 7), Stone::White);
        state.board.place_stone(Pos::new(9, 10), Stone::White);
        state.board.place_stone(Pos::new(9, 5), Stone::White);
        state.board.place_stone(Pos::new(7, 8), Stone::White);
        state.board.place_stone(Pos::new(7, 6), Stone::White);

        state.status = Status::Running;
        state.to_move = Stone::White;
        let (must_capture, forced_capture_moves) = state.compute_forced_capture(Stone::Black);
        assert!(must_capture, "Black's five is statically breakable; White must be forced to break it");
        assert!(!forced_capture_moves.is_empty());

        state.must_capture = must_capture;
        state.forced_capture_moves = forced_capture_moves.clone();
        for &mv in &forced_capture_moves {
            let (ok, _) = is_legal(&state, mv, Stone::White);
            assert!(ok, "forced capture move {mv:?} should itself be legal for White");
        }

        // A non-breaking White move is rejected while must_capture holds.
        let (ok, reason) = is_legal(&state, Pos::new(0, 0), Stone::White);
        assert!(!ok);
        assert_eq!(reason, Some(IllegalReason::MustCapture));
    }

    #[test]
    fn test_is_legal_rejects_out_of_bounds_on_smaller_board() {
        let rules = Rules { board_size: 9, ..Rules::default() };
        let state = GameState::new(rules);
        let (ok, reason) = is_legal(&state, Pos::new(9, 9), Stone::Black);
        assert!(!ok);
        assert_eq!(reason, Some(IllegalReason::OutOfBounds));
    }

    #[test]
    fn test_is_legal_rejects_occupied_square() {
        let mut state = GameState::new(Rules::default());
        let zobrist = ZobristTable::new();
        state.apply(&zobrist, Pos::new(9, 9));
        let (ok, reason) = is_legal(&state, Pos::new(9, 9), Stone::White);
        assert!(!ok);
        assert_eq!(reason, Some(IllegalReason::Occupied));
    }

    #[test]
    fn test_is_legal_rejects_double_three() {
        // Cross pattern: an open two on the row and an open two on the
        // column both complete to a free three at (9,9).
        let mut state = GameState::new(Rules::default());
        state.board.place_stone(Pos::new(9, 8), Stone::Black);
        state.board.place_stone(Pos::new(9, 10), Stone::Black);
        state.board.place_stone(Pos::new(8, 9), Stone::Black);
        state.board.place_stone(Pos::new(10, 9), Stone::Black);

        let (ok, reason) = is_legal(&state, Pos::new(9, 9), Stone::Black);
        assert!(!ok);
        assert_eq!(reason, Some(IllegalReason::ForbiddenDoubleThree));
    }
}
