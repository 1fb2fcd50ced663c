//! Movement tables shared by move generation and attack detection.
//!
//! Leaper targets (knight, king) are pre-computed per square once, via
//! `OnceLock`, and live for the lifetime of the process. Sliding pieces are
//! described by direction vectors and walked against the board at query time.

use std::sync::OnceLock;

use crate::engine::types::{Bitboard, Square};

/// A `(rank delta, file delta)` step.
pub type Direction = (i8, i8);

pub const ROOK_DIRECTIONS: [Direction; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub const BISHOP_DIRECTIONS: [Direction; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const QUEEN_DIRECTIONS: [Direction; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub const KNIGHT_OFFSETS: [Direction; 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

// =========================================================================
// Public API
// =========================================================================

/// Get a reference to the global leaper tables.
pub fn tables() -> &'static AttackTables {
    static TABLES: OnceLock<AttackTables> = OnceLock::new();
    TABLES.get_or_init(AttackTables::init)
}

/// Pre-computed target squares for the pieces whose reach does not depend
/// on occupancy.
pub struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
}

impl AttackTables {
    /// Squares a knight on `sq` reaches on an empty board.
    #[inline]
    pub fn knight_targets(&self, sq: Square) -> Bitboard {
        self.knight[sq.0 as usize]
    }

    /// Squares adjacent to `sq`.
    #[inline]
    pub fn king_targets(&self, sq: Square) -> Bitboard {
        self.king[sq.0 as usize]
    }

    fn init() -> Self {
        AttackTables {
            knight: leaper_table(&KNIGHT_OFFSETS),
            king: leaper_table(&QUEEN_DIRECTIONS),
        }
    }
}

fn leaper_table(offsets: &[Direction]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    for (idx, entry) in table.iter_mut().enumerate() {
        let from = Square(idx as u8);
        *entry = offsets
            .iter()
            .filter_map(|&(dr, df)| from.offset(dr, df))
            .collect();
    }
    table
}

// =========================================================================
// Tests
// =========================================================================
