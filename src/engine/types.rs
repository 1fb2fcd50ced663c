use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Rank the pieces of this colour start on (0 for White, 7 for Black).
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Rank this colour's pawns start on.
    #[inline]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank this colour's pawns promote on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Direction pawns of this colour advance in, as a rank delta.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Capitalised name, as used in status lines and the history file.
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceKind & Piece
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// All piece kinds in order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Uppercase letter used in notation ('P' for pawns).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Parse a piece letter, case-insensitive.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Whether a pawn may promote to this kind.
    #[inline]
    pub fn is_promotion_target(self) -> bool {
        !matches!(self, PieceKind::Pawn | PieceKind::King)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn"),
            PieceKind::Knight => write!(f, "knight"),
            PieceKind::Bishop => write!(f, "bishop"),
            PieceKind::Rook => write!(f, "rook"),
            PieceKind::Queen => write!(f, "queen"),
            PieceKind::King => write!(f, "king"),
        }
    }
}

/// A coloured piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// Diagram character: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// Inverse of [`Piece::to_char`].
    pub fn from_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the board (0..63, a1=0, h1=7, a8=56, h8=63).
///
/// Rank 0 is White's back rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(pub u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    /// Checked constructor from raw `(rank, file)` coordinates, e.g. a UI click.
    pub fn from_coords(rank: i8, file: i8) -> Option<Self> {
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// The square `(dr, df)` away, if still on the board.
    #[inline]
    pub fn offset(self, dr: i8, df: i8) -> Option<Self> {
        Square::from_coords(self.rank() as i8 + dr, self.file() as i8 + df)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file < 8 && rank < 8 {
            Some(Square::from_file_rank(file, rank))
        } else {
            None
        }
    }

    /// File letter, 'a'..'h'.
    #[inline]
    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let rank = (b'1' + self.rank()) as char;
        format!("{}{rank}", self.file_char())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl Serialize for Square {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// A set of squares, one bit per square.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub fn is_set(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.0);
    }

    #[inline]
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Pop the least significant bit, returning the square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let sq = Square(self.0.trailing_zeros() as u8);
            self.0 &= self.0 - 1;
            Some(sq)
        }
    }

    /// Iterate over the members in ascending order (a1, b1, .. h8).
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over set bits in a `Bitboard`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.pop_count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut bb = Bitboard::EMPTY;
        for sq in iter {
            bb.set(sq);
        }
        bb
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let squares: Vec<String> = self.iter().map(Square::to_algebraic).collect();
        write!(f, "Bitboard[{}]", squares.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// What, beyond relocating one piece, a move does to the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    None,
    DoublePush,
    EnPassantCapture,
    Promotion(PieceKind),
    CastleKingside,
    CastleQueenside,
}

/// A fully resolved move: squares, the moving piece, what it captured and
/// which special rule applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub moved: Piece,
    pub captured: Option<Piece>,
    pub special: Special,
}

impl Move {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_pawn_move(&self) -> bool {
        self.moved.kind == PieceKind::Pawn
    }

    /// Square of the pawn removed by an en-passant capture.
    pub fn en_passant_victim(&self) -> Option<Square> {
        match self.special {
            Special::EnPassantCapture => {
                Some(Square::from_file_rank(self.to.file(), self.from.rank()))
            }
            _ => None,
        }
    }

    /// For a castling move, the rook's `(from, to)` squares.
    pub fn castling_rook(&self) -> Option<(Square, Square)> {
        let rank = self.from.rank();
        match self.special {
            Special::CastleKingside => Some((
                Square::from_file_rank(7, rank),
                Square::from_file_rank(5, rank),
            )),
            Special::CastleQueenside => Some((
                Square::from_file_rank(0, rank),
                Square::from_file_rank(3, rank),
            )),
            _ => None,
        }
    }

    /// The piece standing on `to` once the move is made.
    pub fn landing_piece(&self) -> Piece {
        match self.special {
            Special::Promotion(kind) => Piece::new(self.moved.color, kind),
            _ => self.moved,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Special::Promotion(kind) = self.special {
            write!(f, "={}", kind.letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Current status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Check,
    Checkmate { winner: Color },
    Stalemate,
    Draw { reason: DrawReason },
    Resigned { winner: Color },
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate { .. } => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw { reason } => reason.as_str(),
            GameStatus::Resigned { .. } => "resigned",
        }
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::Active | GameStatus::Check)
    }

    /// The winner, for decisive results.
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(*winner),
            _ => None,
        }
    }

    /// Result line for the history file, once the game is over.
    pub fn result_label(&self) -> Option<&'static str> {
        if !self.is_game_over() {
            return None;
        }
        Some(match self.winner() {
            Some(Color::White) => "White wins",
            Some(Color::Black) => "Black wins",
            None => "Draw",
        })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason for a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
    Agreement,
}

impl DrawReason {
    pub fn as_str(&self) -> &str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
            DrawReason::Agreement => "agreement",
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("move {from} -> {to} would leave the king in check")]
    LeavesKingInCheck { from: Square, to: Square },

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(PieceKind),

    #[error("game is already over: {0}")]
    GameOver(GameStatus),

    #[error("invalid board diagram: {0}")]
    InvalidDiagram(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_ranks() {
        assert_eq!(Color::White.back_rank(), 0);
        assert_eq!(Color::Black.back_rank(), 7);
        assert_eq!(Color::White.pawn_rank(), 1);
        assert_eq!(Color::Black.promotion_rank(), 0);
        assert_eq!(Color::Black.forward(), -1);
    }

    #[test]
    fn piece_char_round_trip() {
        for kind in PieceKind::ALL {
            for color in [Color::White, Color::Black] {
                let piece = Piece::new(color, kind);
                let c = piece.to_char();
                assert_eq!(c.is_ascii_uppercase(), color == Color::White);
                assert_eq!(Piece::from_char(c), Some(piece));
            }
        }
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn promotion_targets() {
        assert!(PieceKind::Queen.is_promotion_target());
        assert!(PieceKind::Knight.is_promotion_target());
        assert!(!PieceKind::King.is_promotion_target());
        assert!(!PieceKind::Pawn.is_promotion_target());
    }

    #[test]
    fn square_from_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square(0)));
        assert_eq!(Square::from_algebraic("h1"), Some(Square(7)));
        assert_eq!(Square::from_algebraic("a8"), Some(Square(56)));
        assert_eq!(Square::from_algebraic("E4"), Some(Square(28)));
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("abc"), None);
    }

    #[test]
    fn square_file_rank() {
        let e4 = sq("e4");
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.file_char(), 'e');
        assert_eq!(e4.to_string(), "e4");
    }

    #[test]
    fn square_coords_and_offsets() {
        assert_eq!(Square::from_coords(0, 4), Some(sq("e1")));
        assert_eq!(Square::from_coords(8, 0), None);
        assert_eq!(Square::from_coords(0, -1), None);
        assert_eq!(sq("e4").offset(2, 1), Some(sq("f6")));
        assert_eq!(sq("h8").offset(1, 0), None);
    }

    #[test]
    fn bitboard_set_operations() {
        let mut bb = Bitboard::EMPTY;
        assert!(bb.is_empty());
        bb.set(sq("e4"));
        bb.set(sq("a1"));
        assert!(bb.is_set(sq("e4")));
        assert_eq!(bb.pop_count(), 2);
        assert_eq!(bb.iter().collect::<Vec<_>>(), vec![sq("a1"), sq("e4")]);
        bb.clear(sq("e4"));
        assert_eq!(bb.pop_count(), 1);
        let collected: Bitboard = [sq("b2"), sq("c3")].into_iter().collect();
        assert_eq!(format!("{collected:?}"), "Bitboard[b2, c3]");
    }

    #[test]
    fn move_helpers() {
        let ep = Move {
            from: sq("e5"),
            to: sq("d6"),
            moved: Piece::new(Color::White, PieceKind::Pawn),
            captured: Some(Piece::new(Color::Black, PieceKind::Pawn)),
            special: Special::EnPassantCapture,
        };
        assert_eq!(ep.en_passant_victim(), Some(sq("d5")));
        assert!(ep.is_capture());

        let castle = Move {
            from: sq("e8"),
            to: sq("c8"),
            moved: Piece::new(Color::Black, PieceKind::King),
            captured: None,
            special: Special::CastleQueenside,
        };
        assert_eq!(castle.castling_rook(), Some((sq("a8"), sq("d8"))));

        let promo = Move {
            from: sq("a7"),
            to: sq("a8"),
            moved: Piece::new(Color::White, PieceKind::Pawn),
            captured: None,
            special: Special::Promotion(PieceKind::Knight),
        };
        assert_eq!(promo.landing_piece(), Piece::new(Color::White, PieceKind::Knight));
        assert_eq!(promo.to_string(), "a7a8=n");
    }

    #[test]
    fn game_status_strings() {
        assert_eq!(GameStatus::Active.as_str(), "active");
        assert_eq!(
            GameStatus::Checkmate {
                winner: Color::White
            }
            .as_str(),
            "checkmate"
        );
        assert_eq!(
            GameStatus::Draw {
                reason: DrawReason::ThreefoldRepetition
            }
            .as_str(),
            "threefold_repetition"
        );
    }

    #[test]
    fn game_status_results() {
        assert!(!GameStatus::Check.is_game_over());
        assert_eq!(GameStatus::Active.result_label(), None);
        assert_eq!(
            GameStatus::Checkmate {
                winner: Color::Black
            }
            .result_label(),
            Some("Black wins")
        );
        assert_eq!(
            GameStatus::Resigned {
                winner: Color::White
            }
            .result_label(),
            Some("White wins")
        );
        assert_eq!(GameStatus::Stalemate.result_label(), Some("Draw"));
        assert_eq!(
            GameStatus::Draw {
                reason: DrawReason::FiftyMoveRule
            }
            .result_label(),
            Some("Draw")
        );
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(GameStatus::Checkmate {
            winner: Color::White,
        })
        .unwrap();
        assert_eq!(json["state"], "checkmate");
        assert_eq!(json["winner"], "white");
    }
}
