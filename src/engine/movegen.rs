//! Move generation, attack detection and legality filtering.
//!
//! Pipeline:
//!   1. Compute pseudo-legal targets for one piece (movement pattern and
//!      occupancy only).
//!   2. Filter: play each candidate on a copy of the board and drop it if the
//!      mover's king is attacked afterwards.
//!
//! Everything here is a pure function of a `&Board` plus the side to move
//! and en-passant target; nothing holds on to the board between calls.

use crate::engine::attacks::{
    self, BISHOP_DIRECTIONS, Direction, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};
use crate::engine::board::Board;
use crate::engine::types::{Bitboard, Color, Move, PieceKind, Special, Square};

/// File the king starts on.
const KING_FILE: u8 = 4;

// =========================================================================
// Public API
// =========================================================================

/// Squares the piece on `from` can move to by its movement pattern, ignoring
/// whether the move exposes its own king.
///
/// With `include_special` the en-passant capture and castling targets are
/// added; attack detection calls this with `include_special = false`.
pub fn pseudo_legal_targets(
    board: &Board,
    from: Square,
    en_passant: Option<Square>,
    include_special: bool,
) -> Bitboard {
    let Some(piece) = board.piece_at(from) else {
        return Bitboard::EMPTY;
    };

    match piece.kind {
        PieceKind::Pawn => pawn_targets(board, from, piece.color, en_passant, include_special),
        PieceKind::Knight => leaper_targets(board, attacks::tables().knight_targets(from), piece.color),
        PieceKind::Bishop => slider_targets(board, from, piece.color, &BISHOP_DIRECTIONS),
        PieceKind::Rook => slider_targets(board, from, piece.color, &ROOK_DIRECTIONS),
        PieceKind::Queen => slider_targets(board, from, piece.color, &QUEEN_DIRECTIONS),
        PieceKind::King => {
            let mut targets =
                leaper_targets(board, attacks::tables().king_targets(from), piece.color);
            if include_special {
                targets |= castling_targets(board, from, piece.color);
            }
            targets
        }
    }
}

/// Is `sq` attacked by any piece of colour `by`?
///
/// A square counts as attacked when it is among the non-special pseudo-legal
/// targets of some piece of `by`. For pawns that means pushes and diagonal
/// captures of an occupied square, not the empty diagonals.
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    find_attacker(board, sq, by).is_some()
}

/// Is `color`'s king attacked? A side without a king counts as in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_square_attacked(board, king, !color),
        None => true,
    }
}

/// The first piece of `by` (scanning a1..h8) that attacks `target`.
pub fn find_attacker(board: &Board, target: Square, by: Color) -> Option<Square> {
    board
        .pieces_of(by)
        .find(|&(from, _)| pseudo_legal_targets(board, from, None, false).is_set(target))
        .map(|(from, _)| from)
}

/// Legal destinations for the piece on `from`.
///
/// Empty when the square is empty or holds a piece of the side not to move.
pub fn legal_moves(
    board: &Board,
    from: Square,
    side_to_move: Color,
    en_passant: Option<Square>,
) -> Bitboard {
    match board.piece_at(from) {
        Some(piece) if piece.color == side_to_move => {}
        _ => return Bitboard::EMPTY,
    }

    pseudo_legal_targets(board, from, en_passant, true)
        .iter()
        .filter(|&to| {
            resolve_move(board, from, to, en_passant, None)
                .is_some_and(|mv| !leaves_king_in_check(board, &mv))
        })
        .collect()
}

/// Does `color` have no legal move at all?
pub fn has_no_legal_moves(board: &Board, color: Color, en_passant: Option<Square>) -> bool {
    board
        .pieces_of(color)
        .all(|(from, _)| legal_moves(board, from, color, en_passant).is_empty())
}

/// Every legal move for `side`, with promotions expanded to all four kinds.
pub fn all_legal_moves(board: &Board, side: Color, en_passant: Option<Square>) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, _) in board.pieces_of(side) {
        for to in legal_moves(board, from, side, en_passant).iter() {
            if is_promotion(board, from, to) {
                moves.extend(
                    PieceKind::PROMOTIONS
                        .iter()
                        .filter_map(|&kind| resolve_move(board, from, to, en_passant, Some(kind))),
                );
            } else if let Some(mv) = resolve_move(board, from, to, en_passant, None) {
                moves.push(mv);
            }
        }
    }
    moves
}

/// Classify a `(from, to)` request against the current board.
///
/// Works out the moving piece, what is captured (including the pawn taken
/// en passant) and which special rule applies. A promotion without an
/// explicit kind becomes a queen. Returns `None` if `from` is empty; no
/// legality checks are made.
pub fn resolve_move(
    board: &Board,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
    promotion: Option<PieceKind>,
) -> Option<Move> {
    let moved = board.piece_at(from)?;
    let mut captured = board.piece_at(to);
    let mut special = Special::None;

    match moved.kind {
        PieceKind::Pawn => {
            if Some(to) == en_passant && to.file() != from.file() && captured.is_none() {
                special = Special::EnPassantCapture;
                captured = board.piece_at(Square::from_file_rank(to.file(), from.rank()));
            } else if to.rank() == moved.color.promotion_rank() {
                special = Special::Promotion(promotion.unwrap_or(PieceKind::Queen));
            } else if from.rank().abs_diff(to.rank()) == 2 {
                special = Special::DoublePush;
            }
        }
        PieceKind::King if is_home_square(from, moved.color) && from.rank() == to.rank() => {
            match to.file() {
                6 => special = Special::CastleKingside,
                2 => special = Special::CastleQueenside,
                _ => {}
            }
        }
        _ => {}
    }

    Some(Move {
        from,
        to,
        moved,
        captured,
        special,
    })
}

/// Would moving the piece on `from` to `to` be a pawn reaching its last rank?
pub fn is_promotion(board: &Board, from: Square, to: Square) -> bool {
    board
        .piece_at(from)
        .is_some_and(|p| p.kind == PieceKind::Pawn && to.rank() == p.color.promotion_rank())
}

/// Play `mv` on a copy of the board and report whether the mover's own king
/// ends up attacked.
pub fn leaves_king_in_check(board: &Board, mv: &Move) -> bool {
    let mut copy = *board;
    copy.make_move(mv);
    is_in_check(&copy, mv.moved.color)
}

// =========================================================================
// Per-piece generation (internal)
// =========================================================================

fn pawn_targets(
    board: &Board,
    from: Square,
    color: Color,
    en_passant: Option<Square>,
    include_special: bool,
) -> Bitboard {
    let mut targets = Bitboard::EMPTY;
    let dir = color.forward();

    // --- Pushes ---
    if let Some(one) = from.offset(dir, 0)
        && board.piece_at(one).is_none()
    {
        targets.set(one);
        if from.rank() == color.pawn_rank()
            && let Some(two) = from.offset(2 * dir, 0)
            && board.piece_at(two).is_none()
        {
            targets.set(two);
        }
    }

    // --- Captures (including en passant) ---
    for df in [-1, 1] {
        let Some(to) = from.offset(dir, df) else {
            continue;
        };
        match board.piece_at(to) {
            Some(target) if target.color != color => targets.set(to),
            None if include_special && Some(to) == en_passant => targets.set(to),
            _ => {}
        }
    }

    targets
}

/// Knight and king steps: land on empty or enemy-occupied squares.
fn leaper_targets(board: &Board, reach: Bitboard, color: Color) -> Bitboard {
    reach
        .iter()
        .filter(|&to| board.piece_at(to).is_none_or(|p| p.color != color))
        .collect()
}

fn slider_targets(board: &Board, from: Square, color: Color, directions: &[Direction]) -> Bitboard {
    let mut targets = Bitboard::EMPTY;
    for &(dr, df) in directions {
        let mut cursor = from.offset(dr, df);
        while let Some(to) = cursor {
            match board.piece_at(to) {
                None => targets.set(to),
                Some(blocker) => {
                    if blocker.color != color {
                        targets.set(to);
                    }
                    break;
                }
            }
            cursor = to.offset(dr, df);
        }
    }
    targets
}

// =========================================================================
// Castling
// =========================================================================

fn is_home_square(sq: Square, color: Color) -> bool {
    sq.rank() == color.back_rank() && sq.file() == KING_FILE
}

/// Castling destinations for a king on `from`.
///
/// Eligibility is read off the board alone: king and rook on their home
/// squares, nothing in between, king not in check, and the squares the king
/// crosses and lands on not attacked.
fn castling_targets(board: &Board, from: Square, color: Color) -> Bitboard {
    let mut targets = Bitboard::EMPTY;
    if !is_home_square(from, color) {
        return targets;
    }

    let rank = color.back_rank();
    let at = |file: u8| Square::from_file_rank(file, rank);
    let empty = |files: &[u8]| files.iter().all(|&f| board.piece_at(at(f)).is_none());
    let safe = |files: &[u8]| files.iter().all(|&f| !is_square_attacked(board, at(f), !color));

    if is_in_check(board, color) {
        return targets;
    }

    // Kingside: king e→g, rook h→f.
    if board.has(at(7), color, PieceKind::Rook) && empty(&[5, 6]) && safe(&[5, 6]) {
        targets.set(at(6));
    }

    // Queenside: king e→c, rook a→d. b must be empty but may be attacked.
    if board.has(at(0), color, PieceKind::Rook) && empty(&[1, 2, 3]) && safe(&[3, 2]) {
        targets.set(at(2));
    }

    targets
}

// =========================================================================
// Tests
// =========================================================================
