//! Stateful game controller.
//!
//! `Game` owns the live position, the linear snapshot history with its
//! cursor, the move log and the draw bookkeeping. Every accepted move drops
//! whatever lies beyond the cursor, then appends one snapshot and one
//! notation. Undo and redo only move the cursor and restore snapshots; they
//! never recompute a move.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::board::Board;
use crate::engine::clock::GameClock;
use crate::engine::draw::DrawDetector;
use crate::engine::movegen;
use crate::engine::notation::{self, MoveLog};
use crate::engine::types::{
    Bitboard, ChessError, Color, DrawReason, GameStatus, Move, PieceKind, Special, Square,
};

// =========================================================================
// Promotion prompt
// =========================================================================

/// Asked, synchronously, which piece a pawn promotes to.
///
/// Returning `None` (dialog closed, timeout) promotes to a queen.
pub trait PromotionPrompt {
    fn choose_promotion(&mut self, side: Color, square: Square) -> Option<PieceKind>;
}

impl<F> PromotionPrompt for F
where
    F: FnMut(Color, Square) -> Option<PieceKind>,
{
    fn choose_promotion(&mut self, side: Color, square: Square) -> Option<PieceKind> {
        self(side, square)
    }
}

// =========================================================================
// Snapshot / PlayedMove / GameRecord
// =========================================================================

/// Everything needed to resume play from one point of the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub side_to_move: Color,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
}

impl Snapshot {
    /// The standard initial position, White to move.
    pub fn starting() -> Self {
        Self {
            board: Board::starting(),
            side_to_move: Color::White,
            en_passant: None,
            halfmove_clock: 0,
        }
    }
}

/// A committed move with the notation it was logged under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayedMove {
    #[serde(rename = "move")]
    pub mv: Move,
    pub notation: String,
}

/// A finished game, ready to be written to the history file.
#[derive(Clone, Debug, PartialEq)]
pub struct GameRecord {
    pub finished_at: DateTime<Local>,
    /// `"White wins"`, `"Black wins"` or `"Draw"`.
    pub result: String,
    pub duration: Duration,
    /// The move log in history-file form.
    pub moves: String,
}

/// Serializable view of the live game for a front end.
#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    pub status: GameStatus,
    pub status_line: String,
    pub side_to_move: Color,
    pub in_check: bool,
    pub checking_piece: Option<Square>,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub move_number: usize,
    pub last_move: Option<PlayedMove>,
    pub moves: Vec<String>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub elapsed: String,
    pub board: String,
}

// =========================================================================
// Game
// =========================================================================

#[derive(Clone, Debug)]
pub struct Game {
    // Live position
    board: Board,
    side_to_move: Color,
    en_passant: Option<Square>,
    draws: DrawDetector,
    status: GameStatus,

    // History: `history[i]` is the position after the first `i` moves,
    // `played[i]` the move leading from `history[i]` to `history[i + 1]`.
    history: Vec<Snapshot>,
    played: Vec<PlayedMove>,
    cursor: usize,
    log: MoveLog,

    clock: GameClock,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::starting())
    }

    /// A game starting from an arbitrary position.
    ///
    /// The move log still numbers the first move as White's, whatever the
    /// side to move.
    pub fn from_snapshot(start: Snapshot) -> Self {
        let mut game = Self {
            board: start.board,
            side_to_move: start.side_to_move,
            en_passant: start.en_passant,
            draws: DrawDetector::new(),
            status: GameStatus::Active,
            history: vec![start],
            played: Vec::new(),
            cursor: 0,
            log: MoveLog::new(),
            clock: GameClock::start(),
        };
        game.draws.set_halfmove_clock(start.halfmove_clock);
        game.draws.record_position(&game.board, game.side_to_move);
        game.refresh_status();
        game
    }

    /// Throw the current game away and start over from the initial position.
    pub fn new_game(&mut self) {
        debug!("starting new game");
        *self = Self::new();
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.draws.halfmove_clock()
    }

    /// The move log of the line up to the cursor.
    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    /// Notations of every stored move, including undone ones still
    /// available to redo.
    pub fn notations(&self) -> impl Iterator<Item = &str> {
        self.played.iter().map(|p| p.notation.as_str())
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    /// The move that led to the current position.
    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.cursor.checked_sub(1).map(|i| &self.played[i])
    }

    /// Legal destinations for the piece on `from`, for the side to move.
    pub fn legal_moves_from(&self, from: Square) -> Bitboard {
        movegen::legal_moves(&self.board, from, self.side_to_move, self.en_passant)
    }

    /// Whether moving `from` → `to` would need a promotion choice.
    pub fn needs_promotion(&self, from: Square, to: Square) -> bool {
        movegen::is_promotion(&self.board, from, to) && self.legal_moves_from(from).is_set(to)
    }

    /// The piece giving check to the side to move, if any.
    pub fn checking_piece(&self) -> Option<Square> {
        let king = self.board.find_king(self.side_to_move)?;
        movegen::find_attacker(&self.board, king, !self.side_to_move)
    }

    // -----------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------

    /// Validate and play `from` → `to`, then commit it to the history.
    ///
    /// `promotion` is only consulted when the move promotes; `None` means
    /// a queen.
    pub fn apply_and_commit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<PlayedMove, ChessError> {
        if self.status.is_game_over() {
            warn!(%from, %to, status = %self.status, "move rejected: game is over");
            return Err(ChessError::GameOver(self.status));
        }

        let mover = self.side_to_move;
        if !self.legal_moves_from(from).is_set(to) {
            warn!(%from, %to, side = %mover, "illegal move rejected");
            return Err(ChessError::IllegalMove { from, to });
        }

        let mv = movegen::resolve_move(&self.board, from, to, self.en_passant, promotion)
            .ok_or(ChessError::IllegalMove { from, to })?;
        if let Special::Promotion(kind) = mv.special
            && !kind.is_promotion_target()
        {
            warn!(%from, %to, %kind, "promotion rejected");
            return Err(ChessError::InvalidPromotion(kind));
        }

        let mut next = self.board;
        next.make_move(&mv);
        if movegen::is_in_check(&next, mover) {
            warn!(%from, %to, side = %mover, "move would leave king in check");
            return Err(ChessError::LeavesKingInCheck { from, to });
        }

        // Commit: drop the redo branch, then advance.
        self.history.truncate(self.cursor + 1);
        self.played.truncate(self.cursor);

        self.board = next;
        self.en_passant = match mv.special {
            Special::DoublePush => from.offset(mover.forward(), 0),
            _ => None,
        };
        self.side_to_move = !mover;
        self.draws.update_halfmove_clock(mv.is_pawn_move(), mv.is_capture());
        self.draws.record_position(&self.board, self.side_to_move);

        let notation = notation::build_notation(&mv, &self.board, mover);
        self.log.push(notation.clone());

        self.history.push(self.snapshot());
        let played = PlayedMove { mv, notation };
        self.played.push(played.clone());
        self.cursor += 1;

        self.refresh_status();
        debug!(
            mv = %played.mv,
            notation = %played.notation,
            status = %self.status,
            "move committed"
        );
        Ok(played)
    }

    /// Like [`Game::apply_and_commit`], asking `prompt` for the piece when
    /// the move promotes. Illegal moves are rejected without prompting.
    pub fn apply_and_commit_with(
        &mut self,
        from: Square,
        to: Square,
        prompt: &mut impl PromotionPrompt,
    ) -> Result<PlayedMove, ChessError> {
        let promotion = if !self.is_game_over() && self.needs_promotion(from, to) {
            prompt.choose_promotion(self.side_to_move, to)
        } else {
            None
        };
        self.apply_and_commit(from, to, promotion)
    }

    /// Step back one half-move. Returns `false` at the start of the game.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.draws.forget_position(&self.board, self.side_to_move);
        self.cursor -= 1;
        self.restore(self.history[self.cursor]);
        self.log.pop();
        self.refresh_status();
        debug!(cursor = self.cursor, "undo");
        true
    }

    /// Replay the next stored half-move. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.restore(self.history[self.cursor]);
        self.draws.record_position(&self.board, self.side_to_move);
        self.log.push(self.played[self.cursor - 1].notation.clone());
        self.refresh_status();
        debug!(cursor = self.cursor, "redo");
        true
    }

    // -----------------------------------------------------------------
    // Session-ending actions
    // -----------------------------------------------------------------

    /// Both players agreed to a draw.
    pub fn offer_draw_accepted(&mut self) -> Result<GameStatus, ChessError> {
        self.end_by(GameStatus::Draw {
            reason: DrawReason::Agreement,
        })
    }

    /// The side to move resigns.
    pub fn resign(&mut self) -> Result<GameStatus, ChessError> {
        self.end_by(GameStatus::Resigned {
            winner: !self.side_to_move,
        })
    }

    fn end_by(&mut self, status: GameStatus) -> Result<GameStatus, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }
        self.status = status;
        self.clock.stop();
        debug!(%status, "game ended by agreement or resignation");
        Ok(status)
    }

    // -----------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------

    /// Human-readable status for the status bar.
    pub fn status_line(&self) -> String {
        match self.status {
            GameStatus::Active => format!("{} to move", self.side_to_move.name()),
            GameStatus::Check => format!("{} is in check", self.side_to_move.name()),
            GameStatus::Checkmate { winner } => format!("Checkmate - {} wins", winner.name()),
            GameStatus::Stalemate => "Stalemate - Draw".into(),
            GameStatus::Draw { reason } => match reason {
                DrawReason::ThreefoldRepetition => "Threefold repetition - Draw".into(),
                DrawReason::FiftyMoveRule => "Fifty-move rule - Draw".into(),
                DrawReason::Agreement => "Draw by agreement".into(),
            },
            GameStatus::Resigned { winner } => {
                format!("{} resigns - {} wins", (!winner).name(), winner.name())
            }
        }
    }

    pub fn report(&self) -> StatusReport {
        StatusReport {
            status: self.status,
            status_line: self.status_line(),
            side_to_move: self.side_to_move,
            in_check: movegen::is_in_check(&self.board, self.side_to_move),
            checking_piece: self.checking_piece(),
            en_passant: self.en_passant,
            halfmove_clock: self.draws.halfmove_clock(),
            move_number: self.log.move_number(),
            last_move: self.last_move().cloned(),
            moves: self.log.entries().to_vec(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            elapsed: self.clock.formatted(),
            board: self.board.board_string(),
        }
    }

    /// The record to persist, once the game is over.
    pub fn game_record(&self) -> Option<GameRecord> {
        let result = self.status.result_label()?;
        Some(GameRecord {
            finished_at: Local::now(),
            result: result.to_string(),
            duration: self.clock.elapsed(),
            moves: self.log.render(),
        })
    }

    fn compute_status(&self) -> GameStatus {
        let side = self.side_to_move;
        let in_check = movegen::is_in_check(&self.board, side);

        if movegen::has_no_legal_moves(&self.board, side, self.en_passant) {
            return if in_check {
                GameStatus::Checkmate { winner: !side }
            } else {
                GameStatus::Stalemate
            };
        }
        if self.draws.is_threefold_repetition(&self.board, side) {
            return GameStatus::Draw {
                reason: DrawReason::ThreefoldRepetition,
            };
        }
        if self.draws.is_fifty_move_draw() {
            return GameStatus::Draw {
                reason: DrawReason::FiftyMoveRule,
            };
        }
        if in_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        }
    }

    fn refresh_status(&mut self) {
        self.status = self.compute_status();
        if self.status.is_game_over() {
            self.clock.stop();
        } else {
            self.clock.resume();
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            side_to_move: self.side_to_move,
            en_passant: self.en_passant,
            halfmove_clock: self.draws.halfmove_clock(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.side_to_move = snapshot.side_to_move;
        self.en_passant = snapshot.en_passant;
        self.draws.set_halfmove_clock(snapshot.halfmove_clock);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
