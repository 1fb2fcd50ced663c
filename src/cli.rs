//! Line-oriented terminal front end.
//!
//! Reads one command per line, drives a [`Game`], and writes everything the
//! players need to see to the output. Finished games are appended to the
//! history store when recording is enabled.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::engine::clock::format_elapsed;
use crate::engine::game::Game;
use crate::engine::types::{ChessError, Color, PieceKind, Square};
use crate::store::HistoryStore;

const HELP: &str = "\
Commands:
  <from> <to> [q|r|b|n]   move, e.g. 'e2 e4', 'e2e4' or 'e7 e8 n'
  moves <square>          legal destinations of the piece on <square>
  undo | redo             step back / forward one half-move
  draw                    both players agree to a draw
  resign                  the side to move resigns
  new                     start a new game
  board | log | status    show the board, the move log, or a JSON report
  stats | history         overall score, or the raw history file
  clear-history           delete the history file
  help | quit";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Chess(#[from] ChessError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move {
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    },
    Moves(Square),
    Undo,
    Redo,
    Draw,
    Resign,
    New,
    Board,
    Log,
    Status,
    Stats,
    History,
    ClearHistory,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(CommandError::Usage("type 'help' for a list of commands"));
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "moves" => match args {
                [sq] => Command::Moves(parse_square(sq)?),
                _ => return Err(CommandError::Usage("moves <square>")),
            },
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "draw" => Command::Draw,
            "resign" => Command::Resign,
            "new" => Command::New,
            "board" => Command::Board,
            "log" => Command::Log,
            "status" => Command::Status,
            "stats" => Command::Stats,
            "history" => Command::History,
            "clear-history" => Command::ClearHistory,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return parse_move(head, args),
        };
        Ok(command)
    }
}

fn parse_square(text: &str) -> Result<Square, ChessError> {
    Square::from_algebraic(text).ok_or_else(|| ChessError::InvalidSquare(text.to_string()))
}

fn parse_promotion(text: &str) -> Result<PieceKind, CommandError> {
    let mut chars = text.chars();
    match (chars.next().and_then(PieceKind::from_letter), chars.next()) {
        (Some(kind), None) => Ok(kind),
        _ => Err(CommandError::Usage("promotion piece is one of q, r, b, n")),
    }
}

/// `e2 e4`, `e2 e4 q`, `e2e4`, `e7e8q`.
fn parse_move(head: &str, args: &[&str]) -> Result<Command, CommandError> {
    if !head.is_ascii() {
        return Err(CommandError::Unknown(head.to_string()));
    }
    let (from, to, promotion) = match args {
        [] if head.len() == 4 || head.len() == 5 => {
            let (squares, promo) = head.split_at(4);
            (&squares[..2], &squares[2..], (!promo.is_empty()).then_some(promo))
        }
        [to] if head.len() == 2 => (head, *to, None),
        [to, promo] if head.len() == 2 => (head, *to, Some(*promo)),
        _ => return Err(CommandError::Unknown(head.to_string())),
    };
    Ok(Command::Move {
        from: parse_square(from)?,
        to: parse_square(to)?,
        promotion: promotion.map(parse_promotion).transpose()?,
    })
}

// =========================================================================
// Session
// =========================================================================

pub struct Session<W: Write> {
    game: Game,
    config: AppConfig,
    store: HistoryStore,
    out: W,
    /// The current game already has a record in the history file.
    saved: bool,
}

impl<W: Write> Session<W> {
    pub fn new(config: AppConfig, out: W) -> Self {
        Self {
            game: Game::new(),
            store: HistoryStore::new(config.history_file.clone()),
            config,
            out,
            saved: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Process commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        writeln!(self.out, "{}", self.game.board())?;
        writeln!(self.out, "{}", self.game.status_line())?;

        let mut lines = input.lines();
        while let Some(line) = lines.next() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    debug!(?command, "command");
                    self.execute(command, &mut lines)?;
                }
                Err(e) => writeln!(self.out, "{e}")?,
            }
        }
        self.out.flush()
    }

    fn execute(
        &mut self,
        command: Command,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> io::Result<()> {
        match command {
            Command::Move {
                from,
                to,
                promotion,
            } => self.play(from, to, promotion, lines)?,
            Command::Moves(sq) => {
                let targets: Vec<String> = self
                    .game
                    .legal_moves_from(sq)
                    .iter()
                    .map(|s| s.to_algebraic())
                    .collect();
                if targets.is_empty() {
                    writeln!(self.out, "no legal moves from {sq}")?;
                } else {
                    writeln!(self.out, "{sq}: {}", targets.join(" "))?;
                }
            }
            Command::Undo => {
                if self.game.undo() {
                    self.show_position()?;
                } else {
                    writeln!(self.out, "nothing to undo")?;
                }
            }
            Command::Redo => {
                if self.game.redo() {
                    self.show_position()?;
                } else {
                    writeln!(self.out, "nothing to redo")?;
                }
            }
            Command::Draw => match self.game.offer_draw_accepted() {
                Ok(_) => self.finish_game()?,
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::Resign => match self.game.resign() {
                Ok(_) => self.finish_game()?,
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::New => {
                self.game.new_game();
                self.saved = false;
                self.show_position()?;
            }
            Command::Board => writeln!(self.out, "{}", self.game.board())?,
            Command::Log => {
                let log = self.game.log().render();
                writeln!(self.out, "{}", log.trim_end())?;
            }
            Command::Status => {
                let json = serde_json::to_string_pretty(&self.game.report())
                    .map_err(io::Error::other)?;
                writeln!(self.out, "{json}")?;
            }
            Command::Stats => writeln!(self.out, "{}", self.store.statistics())?,
            Command::History => match self.store.read_all() {
                Ok(text) if text.trim().is_empty() => writeln!(self.out, "no games recorded")?,
                Ok(text) => write!(self.out, "{text}")?,
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::ClearHistory => match self.store.clear() {
                Ok(()) => writeln!(self.out, "history cleared")?,
                Err(e) => writeln!(self.out, "{e}")?,
            },
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn play(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
        lines: &mut impl Iterator<Item = io::Result<String>>,
    ) -> io::Result<()> {
        let result = match promotion {
            Some(kind) => self.game.apply_and_commit(from, to, Some(kind)),
            None => {
                let out = &mut self.out;
                let mut ask = |side: Color, at: Square| {
                    let shown = write!(
                        out,
                        "{} pawn promotes on {at}, choose q/r/b/n [q]: ",
                        side.name()
                    )
                    .and_then(|()| out.flush());
                    if let Err(e) = shown {
                        warn!(error = %e, "could not show promotion prompt");
                    }
                    lines
                        .next()
                        .and_then(Result::ok)
                        .and_then(|answer| answer.trim().chars().next())
                        .and_then(PieceKind::from_letter)
                };
                self.game.apply_and_commit_with(from, to, &mut ask)
            }
        };

        match result {
            Ok(played) => {
                writeln!(self.out, "{}", played.notation)?;
                if self.game.is_game_over() {
                    self.finish_game()?;
                } else {
                    self.show_position()?;
                }
            }
            Err(e) => writeln!(self.out, "{e}")?,
        }
        Ok(())
    }

    fn show_position(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.game.board())?;
        writeln!(self.out, "{}", self.game.status_line())
    }

    /// Announce the result, store the game and print the overall score.
    fn finish_game(&mut self) -> io::Result<()> {
        self.show_position()?;
        let Some(record) = self.game.game_record() else {
            return Ok(());
        };
        writeln!(self.out, "Game over after {}", format_elapsed(record.duration))?;

        if !self.config.record_games {
            return Ok(());
        }
        // Undoing past the end and finishing again must not count twice.
        if self.saved {
            debug!("game already in history, not appending again");
            return writeln!(self.out, "Game already saved to history");
        }
        if let Err(e) = self.store.append(&record) {
            warn!(error = %e, "could not save finished game");
            writeln!(self.out, "Failed to save game history: {e}")?;
            return Ok(());
        }
        self.saved = true;
        writeln!(self.out, "{}", self.store.statistics())
    }
}
