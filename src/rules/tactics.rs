//! Tactical lookahead built on capture and win detection.
//!
//! These operations answer the questions the search driver needs before it
//! falls back to full alpha-beta: can the attacker close the game out by
//! capture right now, and if a side has just created one or more winning
//! alignments, can the opponent capture its way out of *all* of them at
//! once? The single-alignment case is already handled by
//! [`crate::rules::win::can_break_five_by_capture`]; the multi-alignment
//! generalization here is what the engine's break-five / illusory-break
//! staged checks were doing implicitly, lifted into a reusable rule.

use crate::board::{Board, Pos, Stone, BOARD_SIZE};

use super::capture::{execute_captures_fast, undo_captures};
use super::forbidden::is_valid_move;

/// Direction vectors for line scanning (4 axes).
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Search legal moves for `attacker` that bring its pair count to
/// `capture_win_pairs`, closing out a capture win immediately. Returns the
/// first such move found, or `None` if no single move can close the gap
/// (a move captures at most one pair, so this is a no-op check unless
/// `attacker` is already one pair away).
#[must_use]
pub fn find_immediate_capture_win_move(
    board: &Board,
    attacker: Stone,
    capture_win_pairs: u8,
) -> Option<Pos> {
    if board.captures(attacker) + 1 < capture_win_pairs {
        return None; // a single move captures at most one pair
    }

    let mut test_board = board.clone();
    for r in 0..BOARD_SIZE as u8 {
        for c in 0..BOARD_SIZE as u8 {
            let pos = Pos::new(r, c);
            if !is_valid_move(board, pos, attacker, BOARD_SIZE as u8) {
                continue;
            }

            test_board.place_stone(pos, attacker);
            let cap_info = execute_captures_fast(&mut test_board, pos, attacker);
            let reached = test_board.captures(attacker) >= capture_win_pairs;
            undo_captures(&mut test_board, attacker, &cap_info);
            test_board.remove_stone(pos);

            if reached {
                return Some(pos);
            }
        }
    }
    None
}

/// Every maximal run of `≥ win_length` stones of `color` currently on the
/// board, as the list of positions making it up. A position only starts a
/// line in a direction if there is no same-color stone immediately behind
/// it along that direction, so each run is reported exactly once.
fn alignments(board: &Board, color: Stone, win_length: usize) -> Vec<Vec<Pos>> {
    let mut lines = Vec::new();
    let Some(stones) = board.stones(color) else {
        return lines;
    };

    for pos in stones.iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            let prev_r = pos.row as i32 - dr;
            let prev_c = pos.col as i32 - dc;
            if Pos::is_valid(prev_r, prev_c)
                && board.get(Pos::new(prev_r as u8, prev_c as u8)) == color
            {
                continue; // not the start of this run
            }

            let mut line = vec![pos];
            let mut r = pos.row as i32 + dr;
            let mut c = pos.col as i32 + dc;
            while Pos::is_valid(r, c) && board.get(Pos::new(r as u8, c as u8)) == color {
                line.push(Pos::new(r as u8, c as u8));
                r += dr;
                c += dc;
            }

            if line.len() >= win_length {
                lines.push(line);
            }
        }
    }
    lines
}

/// True if `mover`'s opponent has a legal move whose captures remove at
/// least one stone from *every* current winning alignment of `mover`. A
/// mover with no winning alignment trivially has nothing to break.
#[must_use]
pub fn opponent_can_break_alignment_by_capture(board: &Board, mover: Stone, win_length: usize) -> bool {
    !find_alignment_break_captures(board, mover, win_length).is_empty()
}

/// Same predicate as [`opponent_can_break_alignment_by_capture`], returning
/// the set of moves that achieve it.
#[must_use]
pub fn find_alignment_break_captures(board: &Board, mover: Stone, win_length: usize) -> Vec<Pos> {
    let opponent = mover.opponent();
    let lines = alignments(board, mover, win_length);
    if lines.is_empty() {
        return Vec::new();
    }

    let mut breaks = Vec::new();
    let mut test_board = board.clone();

    for r in 0..BOARD_SIZE as u8 {
        for c in 0..BOARD_SIZE as u8 {
            let pos = Pos::new(r, c);
            if !is_valid_move(board, pos, opponent, BOARD_SIZE as u8) {
                continue;
            }

            test_board.place_stone(pos, opponent);
            let cap_info = execute_captures_fast(&mut test_board, pos, opponent);
            let captured = &cap_info.positions[..cap_info.count as usize];

            let erases_all = lines
                .iter()
                .all(|line| line.iter().any(|p| captured.contains(p)));

            undo_captures(&mut test_board, opponent, &cap_info);
            test_board.remove_stone(pos);

            if erases_all {
                breaks.push(pos);
            }
        }
    }

    breaks
}
