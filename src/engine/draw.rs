//! Halfmove clock and position-repetition bookkeeping.
//!
//! `DrawDetector` knows nothing about move legality. The game controller
//! feeds it the position reached after every move and the pawn/capture flags
//! of that move, and asks it whether a fifty-move or threefold draw applies.

use std::collections::HashMap;

use crate::engine::board::Board;
use crate::engine::types::Color;

/// Number of consecutive half-moves without a pawn move or capture that
/// ends the game.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of the same position that make a threefold repetition.
pub const REPETITION_LIMIT: u32 = 3;

#[derive(Clone, Debug, Default)]
pub struct DrawDetector {
    halfmove_clock: u32,
    positions: HashMap<String, u32>,
}

impl DrawDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `board` with `side_to_move` to play.
    pub fn record_position(&mut self, board: &Board, side_to_move: Color) {
        *self.positions.entry(key(board, side_to_move)).or_insert(0) += 1;
    }

    /// Undo one `record_position` call for the same position.
    pub fn forget_position(&mut self, board: &Board, side_to_move: Color) {
        let key = key(board, side_to_move);
        if let Some(count) = self.positions.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.positions.remove(&key);
            }
        }
    }

    /// How many times this position has been recorded.
    pub fn occurrences(&self, board: &Board, side_to_move: Color) -> u32 {
        self.positions
            .get(&key(board, side_to_move))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_threefold_repetition(&self, board: &Board, side_to_move: Color) -> bool {
        self.occurrences(board, side_to_move) >= REPETITION_LIMIT
    }

    /// Advance the clock by one half-move, or reset it after a pawn move or
    /// capture.
    pub fn update_halfmove_clock(&mut self, pawn_moved: bool, captured: bool) {
        if pawn_moved || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
    }

    pub fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= FIFTY_MOVE_HALFMOVES
    }

    /// Clear the clock and the repetition table for a new game.
    pub fn reset(&mut self) {
        self.halfmove_clock = 0;
        self.positions.clear();
    }
}

fn key(board: &Board, side_to_move: Color) -> String {
    let mut key = board.position_key();
    key.push(match side_to_move {
        Color::White => 'w',
        Color::Black => 'b',
    });
    key
}
