//! Perft (PERFormance Test): exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth matches
//! known-correct values for standard positions. If perft is wrong at any
//! depth, there is a bug in move generation, move application, or legality
//! filtering.
//!
//! Castling here is judged from occupancy alone, so only depths at which no
//! king or rook can leave and return to its home square are compared with
//! the published numbers.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use hotseat_chess::engine::board::Board;
use hotseat_chess::engine::movegen::all_legal_moves;
use hotseat_chess::engine::types::{Color, Special, Square};

/// Recursive perft: count leaf nodes at `depth`.
fn perft(board: &Board, side: Color, en_passant: Option<Square>, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = all_legal_moves(board, side, en_passant);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = *board;
        child.make_move(&mv);
        let next_ep = match mv.special {
            Special::DoublePush => mv.from.offset(side.forward(), 0),
            _ => None,
        };
        nodes += perft(&child, !side, next_ep, depth - 1);
    }
    nodes
}

// =====================================================================
// Position 1: starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft(&Board::starting(), Color::White, None, 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft(&Board::starting(), Color::White, None, 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft(&Board::starting(), Color::White, None, 3), 8_902);
}

// =====================================================================
// Position 2: "Kiwipete" (castling, en passant, pins, promotions)
// =====================================================================

fn kiwipete() -> Board {
    Board::from_diagram(
        "
        8 r . . . k . . r
        7 p . p p q p b .
        6 b n . . p n p .
        5 . . . P N . . .
        4 . p . . P . . .
        3 . . N . . Q . p
        2 P P P B B P P P
        1 R . . . K . . R
          a b c d e f g h
        ",
    )
    .unwrap()
}

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(perft(&kiwipete(), Color::White, None, 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    assert_eq!(perft(&kiwipete(), Color::White, None, 2), 2_039);
}

// =====================================================================
// Position 3: rook endgame with en-passant pins
// =====================================================================

fn position_3() -> Board {
    Board::from_diagram(
        "
        ........
        ..p.....
        ...p....
        KP.....r
        .R...p.k
        ........
        ....P.P.
        ........
        ",
    )
    .unwrap()
}

#[test]
fn perft_position_3_depth_1() {
    assert_eq!(perft(&position_3(), Color::White, None, 1), 14);
}

#[test]
fn perft_position_3_depth_2() {
    assert_eq!(perft(&position_3(), Color::White, None, 2), 191);
}

#[test]
fn perft_position_3_depth_3() {
    assert_eq!(perft(&position_3(), Color::White, None, 3), 2_812);
}
