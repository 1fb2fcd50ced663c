//! Short algebraic notation for committed moves, and the numbered move log.
//!
//! Examples: `e4`, `exd5`, `Nf3`, `Bxe5+`, `Kg1`.
//!
//! The notation is deliberately minimal: no `#` for mate, no
//! disambiguation between two pieces of the same kind, castling is written
//! as the king's move (`Kg1`) and promotions carry no `=Q` suffix.

use std::fmt;

use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::types::{Color, Move, PieceKind};

/// Notation for `mv`, given the board after it was played.
///
/// A `+` is appended when the opponent of `side_just_moved` is in check on
/// `board_after`.
pub fn build_notation(mv: &Move, board_after: &Board, side_just_moved: Color) -> String {
    let mut san = String::with_capacity(6);

    if mv.moved.kind == PieceKind::Pawn {
        if mv.is_capture() {
            san.push(mv.from.file_char());
            san.push('x');
        }
    } else {
        san.push(mv.moved.kind.letter());
        if mv.is_capture() {
            san.push('x');
        }
    }
    san.push_str(&mv.to.to_algebraic());

    if movegen::is_in_check(board_after, !side_just_moved) {
        san.push('+');
    }
    san
}

// =========================================================================
// MoveLog
// =========================================================================

/// Half-moves of the current line, in play order.
///
/// Entries alternate White, Black, starting with White. White's move opens
/// numbered entry `n`; Black's move completes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveLog {
    halves: Vec<String>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, san: impl Into<String>) {
        self.halves.push(san.into());
    }

    /// Remove the most recent half-move.
    pub fn pop(&mut self) -> Option<String> {
        self.halves.pop()
    }

    pub fn clear(&mut self) {
        self.halves.clear();
    }

    pub fn len(&self) -> usize {
        self.halves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.halves.is_empty()
    }

    /// The half-moves in play order.
    pub fn entries(&self) -> &[String] {
        &self.halves
    }

    /// Number of the entry the next White move would open.
    pub fn move_number(&self) -> usize {
        self.halves.len() / 2 + 1
    }

    /// The log in history-file form: `1. e4 , e5\n2. Nf3 , `.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MoveLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, san) in self.halves.iter().enumerate() {
            if i % 2 == 0 {
                write!(f, "{}. {san} , ", i / 2 + 1)?;
            } else {
                writeln!(f, "{san}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Piece, Special, Square};
    use pretty_assertions::assert_eq;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn mv(board: &Board, from: &str, to: &str) -> Move {
        movegen::resolve_move(board, sq(from), sq(to), None, None).unwrap()
    }

    fn played(board: &Board, m: &Move) -> Board {
        let mut after = *board;
        after.make_move(m);
        after
    }

    #[test]
    fn pawn_push_is_destination_only() {
        let b = Board::starting();
        let m = mv(&b, "e2", "e4");
        assert_eq!(build_notation(&m, &played(&b, &m), Color::White), "e4");
    }

    #[test]
    fn piece_move_has_letter() {
        let b = Board::starting();
        let m = mv(&b, "g1", "f3");
        assert_eq!(build_notation(&m, &played(&b, &m), Color::White), "Nf3");
    }

    #[test]
    fn pawn_capture_prefixes_origin_file() {
        let b = Board::from_diagram(
            "
            ....k...
            ........
            ........
            ...p....
            ....P...
            ........
            ........
            ....K...
            ",
        )
        .unwrap();
        let m = mv(&b, "e4", "d5");
        assert_eq!(build_notation(&m, &played(&b, &m), Color::White), "exd5");
    }

    #[test]
    fn capture_with_check() {
        let b = Board::from_diagram(
            "
            ....k...
            ........
            ........
            ....p...
            ........
            ........
            ........
            ....R..K
            ",
        )
        .unwrap();
        let m = mv(&b, "e1", "e5");
        assert_eq!(build_notation(&m, &played(&b, &m), Color::White), "Rxe5+");
    }

    #[test]
    fn castling_written_as_king_move() {
        let b = Board::from_diagram(
            "
            ....k...
            ........
            ........
            ........
            ........
            ........
            ........
            ....K..R
            ",
        )
        .unwrap();
        let m = mv(&b, "e1", "g1");
        assert_eq!(m.special, Special::CastleKingside);
        assert_eq!(build_notation(&m, &played(&b, &m), Color::White), "Kg1");
    }

    #[test]
    fn promotion_has_no_suffix() {
        let b = Board::from_diagram(
            "
            k.......
            ....P...
            ........
            ........
            ........
            ........
            ........
            ....K...
            ",
        )
        .unwrap();
        let m = mv(&b, "e7", "e8");
        let after = played(&b, &m);
        assert_eq!(after.piece_at(sq("e8")), Some(Piece::new(Color::White, PieceKind::Queen)));
        assert_eq!(build_notation(&m, &after, Color::White), "e8+");
    }

    #[test]
    fn log_renders_numbered_pairs() {
        let mut log = MoveLog::new();
        log.push("e4");
        log.push("e5");
        log.push("Nf3");
        assert_eq!(log.render(), "1. e4 , e5\n2. Nf3 , ");
        assert_eq!(log.move_number(), 2);
    }

    #[test]
    fn pop_keeps_numbering_aligned() {
        let mut log = MoveLog::new();
        log.push("e4");
        log.push("e5");
        log.push("Nf3");
        assert_eq!(log.pop().as_deref(), Some("Nf3"));
        assert_eq!(log.move_number(), 2);
        assert_eq!(log.pop().as_deref(), Some("e5"));
        assert_eq!(log.render(), "1. e4 , ");
        log.push("c5");
        assert_eq!(log.render(), "1. e4 , c5\n");
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.pop(), None);
        assert_eq!(log.move_number(), 1);
    }
}
