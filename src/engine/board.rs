//! Mailbox board representation.
//!
//! `Board` is a fixed 64-cell array of optional pieces, indexed by
//! [`Square`] (a1 = 0, b1 = 1, … h8 = 63). It is `Copy`, so legality
//! filtering simulates each candidate move on a value copy.

use std::fmt;

use crate::engine::types::{ChessError, Color, Move, Piece, PieceKind, Square};

/// Back-rank piece order from the a-file to the h-file.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// An 8×8 grid holding at most one piece per square.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; Square::NUM],
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            cells: [None; Square::NUM],
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            for (file, &kind) in BACK_RANK.iter().enumerate() {
                let file = file as u8;
                board.place(
                    Square::from_file_rank(file, color.back_rank()),
                    Some(Piece::new(color, kind)),
                );
                board.place(
                    Square::from_file_rank(file, color.pawn_rank()),
                    Some(Piece::new(color, PieceKind::Pawn)),
                );
            }
        }
        board
    }

    /// Parse a text diagram as produced by [`Board::board_string`].
    ///
    /// Eight rank lines, rank 8 first, one character per square (`.` for an
    /// empty square, piece letters uppercase for White). Whitespace, leading
    /// rank digits and the `a b c … h` footer are ignored.
    pub fn from_diagram(diagram: &str) -> Result<Self, ChessError> {
        let mut board = Board::empty();
        let mut rank_lines = 0u8;

        for line in diagram.lines() {
            let mut cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.is_empty() || cells.iter().collect::<String>() == "abcdefgh" {
                continue;
            }
            if cells.len() == 9 && cells[0].is_ascii_digit() {
                cells.remove(0);
            }
            if cells.len() != 8 {
                return Err(ChessError::InvalidDiagram(format!(
                    "rank line '{}' has {} squares instead of 8",
                    line.trim(),
                    cells.len()
                )));
            }
            if rank_lines == 8 {
                return Err(ChessError::InvalidDiagram("more than 8 ranks".into()));
            }

            let rank = 7 - rank_lines;
            for (file, ch) in cells.into_iter().enumerate() {
                let sq = Square::from_file_rank(file as u8, rank);
                match ch {
                    '.' => {}
                    _ => {
                        let piece = Piece::from_char(ch).ok_or_else(|| {
                            ChessError::InvalidDiagram(format!("invalid piece character '{ch}'"))
                        })?;
                        board.place(sq, Some(piece));
                    }
                }
            }
            rank_lines += 1;
        }

        if rank_lines != 8 {
            return Err(ChessError::InvalidDiagram(format!(
                "expected 8 ranks, got {rank_lines}"
            )));
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

// ---------------------------------------------------------------------------
// Queries & mutation
// ---------------------------------------------------------------------------

impl Board {
    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.0 as usize]
    }

    /// Put `piece` on `sq`, replacing whatever was there. `None` clears it.
    #[inline]
    pub fn place(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.0 as usize] = piece;
    }

    /// All occupied squares with their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.map(|p| (Square(idx as u8), p)))
    }

    /// Squares holding pieces of `color`.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    /// The first king of `color` in a1..h8 order, if any.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Whether `sq` holds a piece of exactly this colour and kind.
    #[inline]
    pub fn has(&self, sq: Square, color: Color, kind: PieceKind) -> bool {
        self.piece_at(sq) == Some(Piece::new(color, kind))
    }

    /// Apply an already-resolved move: relocate the piece, remove whatever
    /// it captures (including the pawn taken en passant), move the castling
    /// rook and swap in the promotion piece.
    ///
    /// No legality checks happen here.
    pub fn make_move(&mut self, mv: &Move) {
        if let Some(victim) = mv.en_passant_victim() {
            self.place(victim, None);
        }
        self.place(mv.from, None);
        self.place(mv.to, Some(mv.landing_piece()));
        if let Some((rook_from, rook_to)) = mv.castling_rook() {
            let rook = self.piece_at(rook_from);
            self.place(rook_from, None);
            self.place(rook_to, rook);
        }
    }

    /// Canonical serialization of the placement: 64 characters, a1..h8,
    /// `.` for empty squares.
    pub fn position_key(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.map_or('.', Piece::to_char))
            .collect()
    }

    /// Render the board as an 8-line diagram (rank 8 at top) plus a file footer.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                s.push(self.piece_at(sq).map_or('.', Piece::to_char));
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board(")?;
        writeln!(f, "{}", self.board_string())?;
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Special;
    use pretty_assertions::assert_eq;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn white(kind: PieceKind) -> Option<Piece> {
        Some(Piece::new(Color::White, kind))
    }

    fn black(kind: PieceKind) -> Option<Piece> {
        Some(Piece::new(Color::Black, kind))
    }

    #[test]
    fn starting_position_layout() {
        let b = Board::starting();
        assert_eq!(b.piece_at(sq("e1")), white(PieceKind::King));
        assert_eq!(b.piece_at(sq("d8")), black(PieceKind::Queen));
        assert_eq!(b.piece_at(sq("a1")), white(PieceKind::Rook));
        assert_eq!(b.piece_at(sq("g8")), black(PieceKind::Knight));
        for file in 0..8 {
            assert_eq!(b.piece_at(Square::from_file_rank(file, 1)), white(PieceKind::Pawn));
            assert_eq!(b.piece_at(Square::from_file_rank(file, 6)), black(PieceKind::Pawn));
            assert_eq!(b.piece_at(Square::from_file_rank(file, 4)), None);
        }
        assert_eq!(b.pieces().count(), 32);
        assert_eq!(b.pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn starting_position_diagram() {
        let expected = "\
8 r n b q k b n r
7 p p p p p p p p
6 . . . . . . . .
5 . . . . . . . .
4 . . . . . . . .
3 . . . . . . . .
2 P P P P P P P P
1 R N B Q K B N R
  a b c d e f g h";
        assert_eq!(Board::starting().board_string(), expected);
    }

    #[test]
    fn diagram_round_trip() {
        let b = Board::starting();
        assert_eq!(Board::from_diagram(&b.board_string()).unwrap(), b);
    }

    #[test]
    fn diagram_without_labels() {
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
        assert_eq!(b.piece_at(sq("e8")), black(PieceKind::King));
        assert_eq!(b.piece_at(sq("h1")), white(PieceKind::Rook));
        assert_eq!(b.pieces().count(), 3);
    }

    #[test]
    fn diagram_errors() {
        assert!(Board::from_diagram("").is_err());
        assert!(Board::from_diagram("........\n").is_err());
        let bad_char = "x.......\n".to_string() + &"........\n".repeat(7);
        assert!(matches!(
            Board::from_diagram(&bad_char),
            Err(ChessError::InvalidDiagram(_))
        ));
        let short = ".......\n".repeat(8);
        assert!(Board::from_diagram(&short).is_err());
    }

    #[test]
    fn place_and_clear() {
        let mut b = Board::empty();
        b.place(sq("d4"), white(PieceKind::Knight));
        assert_eq!(b.piece_at(sq("d4")), white(PieceKind::Knight));
        assert!(b.has(sq("d4"), Color::White, PieceKind::Knight));
        b.place(sq("d4"), black(PieceKind::Bishop));
        assert_eq!(b.piece_at(sq("d4")), black(PieceKind::Bishop));
        b.place(sq("d4"), None);
        assert_eq!(b.pieces().count(), 0);
    }

    #[test]
    fn copies_are_independent() {
        let original = Board::starting();
        let mut copy = original;
        copy.place(sq("e2"), None);
        assert_eq!(original.piece_at(sq("e2")), white(PieceKind::Pawn));
        assert_eq!(copy.piece_at(sq("e2")), None);
    }

    #[test]
    fn find_king_missing() {
        let mut b = Board::empty();
        assert_eq!(b.find_king(Color::White), None);
        b.place(sq("g1"), white(PieceKind::King));
        assert_eq!(b.find_king(Color::White), Some(sq("g1")));
        assert_eq!(b.find_king(Color::Black), None);
    }

    #[test]
    fn make_move_castling_moves_rook() {
        let mut b = Board::empty();
        b.place(sq("e1"), white(PieceKind::King));
        b.place(sq("h1"), white(PieceKind::Rook));
        b.make_move(&Move {
            from: sq("e1"),
            to: sq("g1"),
            moved: Piece::new(Color::White, PieceKind::King),
            captured: None,
            special: Special::CastleKingside,
        });
        assert_eq!(b.piece_at(sq("g1")), white(PieceKind::King));
        assert_eq!(b.piece_at(sq("f1")), white(PieceKind::Rook));
        assert_eq!(b.piece_at(sq("h1")), None);
        assert_eq!(b.piece_at(sq("e1")), None);
    }

    #[test]
    fn make_move_en_passant_removes_victim() {
        let mut b = Board::empty();
        b.place(sq("e5"), white(PieceKind::Pawn));
        b.place(sq("d5"), black(PieceKind::Pawn));
        b.make_move(&Move {
            from: sq("e5"),
            to: sq("d6"),
            moved: Piece::new(Color::White, PieceKind::Pawn),
            captured: black(PieceKind::Pawn),
            special: Special::EnPassantCapture,
        });
        assert_eq!(b.piece_at(sq("d6")), white(PieceKind::Pawn));
        assert_eq!(b.piece_at(sq("d5")), None);
        assert_eq!(b.piece_at(sq("e5")), None);
    }

    #[test]
    fn make_move_promotion_swaps_piece() {
        let mut b = Board::empty();
        b.place(sq("b2"), black(PieceKind::Pawn));
        b.place(sq("a1"), white(PieceKind::Rook));
        b.make_move(&Move {
            from: sq("b2"),
            to: sq("a1"),
            moved: Piece::new(Color::Black, PieceKind::Pawn),
            captured: white(PieceKind::Rook),
            special: Special::Promotion(PieceKind::Queen),
        });
        assert_eq!(b.piece_at(sq("a1")), black(PieceKind::Queen));
        assert_eq!(b.pieces().count(), 1);
    }

    #[test]
    fn position_key_distinguishes_placements() {
        let start = Board::starting();
        let key = start.position_key();
        assert_eq!(key.len(), 64);
        assert!(key.starts_with("RNBQKBNRPPPPPPPP"));
        assert!(key.ends_with("pppppppprnbqkbnr"));
        let mut moved = start;
        moved.place(sq("e2"), None);
        moved.place(sq("e4"), white(PieceKind::Pawn));
        assert_ne!(moved.position_key(), key);
    }
}
