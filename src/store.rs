//! Append-only history of finished games and the statistics read back from it.
//!
//! One block per game:
//!
//! ```text
//! === Game 2024-05-01 18:30:12 ===
//! Result: White wins
//! Duration: 00:12:41:305
//! Moves:
//! 1. e4 , e5
//! 2. Qh5 , Nc6
//! ...
//! ```

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::clock::format_elapsed;
use crate::engine::game::GameRecord;

const GAME_HEADER: &str = "=== Game ";
const RESULT_PREFIX: &str = "Result: ";
const DURATION_PREFIX: &str = "Duration: ";
/// Length of an `HH:mm:ss:SSS` field.
const DURATION_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot write history file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read history file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot delete history file {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// =========================================================================
// HistoryStore
// =========================================================================

#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one finished game, creating the file if needed.
    pub fn append(&self, record: &GameRecord) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(format_record(record).as_bytes())
            .map_err(write_err)?;
        debug!(path = %self.path.display(), result = %record.result, "game appended to history");
        Ok(())
    }

    /// The whole history text; empty when the file does not exist.
    pub fn read_all(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Totals over every stored game. An unreadable file yields zeros.
    pub fn statistics(&self) -> Statistics {
        match self.read_all() {
            Ok(content) => Statistics::parse(&content),
            Err(e) => {
                warn!(error = %e, "history unreadable, reporting empty statistics");
                Statistics::default()
            }
        }
    }

    /// Delete the history file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "history cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// The text block written for one game.
pub fn format_record(record: &GameRecord) -> String {
    format!(
        "{GAME_HEADER}{} ===\n{RESULT_PREFIX}{}\n{DURATION_PREFIX}{}\nMoves:\n{}\n\n",
        record.finished_at.format("%Y-%m-%d %H:%M:%S"),
        record.result,
        format_elapsed(record.duration),
        record.moves,
    )
}

// =========================================================================
// Statistics
// =========================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub games: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    #[serde(serialize_with = "serialize_millis")]
    pub total_time: Duration,
}

impl Statistics {
    /// Tally the games in a history text.
    pub fn parse(content: &str) -> Self {
        let mut stats = Statistics::default();
        for block in content.split(GAME_HEADER) {
            if block.trim().is_empty() {
                continue;
            }
            stats.games += 1;
            match result_of(block) {
                Some("White wins") => stats.white_wins += 1,
                Some("Black wins") => stats.black_wins += 1,
                Some("Draw") => stats.draws += 1,
                _ => {}
            }
            stats.total_time += duration_of(block).unwrap_or_default();
        }
        stats
    }

    /// Total play time as `HH:mm:ss`.
    pub fn total_time_hms(&self) -> String {
        let secs = self.total_time.as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overall score:")?;
        writeln!(f, "Games played: {}", self.games)?;
        writeln!(f, "White wins: {}", self.white_wins)?;
        writeln!(f, "Black wins: {}", self.black_wins)?;
        writeln!(f, "Draws: {}", self.draws)?;
        write!(f, "Total play time: {}", self.total_time_hms())
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

fn result_of(block: &str) -> Option<&str> {
    block
        .lines()
        .find_map(|line| line.strip_prefix(RESULT_PREFIX))
        .map(str::trim)
}

fn duration_of(block: &str) -> Option<Duration> {
    let start = block.find(DURATION_PREFIX)? + DURATION_PREFIX.len();
    let field: String = block[start..].chars().take(DURATION_LEN).collect();
    if field.chars().count() != DURATION_LEN {
        return None;
    }
    parse_duration(&field)
}

/// Parse `HH:mm:ss:SSS`. Anything but four colon-separated integers is
/// rejected.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let parts = text
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [h, m, s, ms] = parts[..] else {
        return None;
    };
    Some(Duration::from_millis(h * 3_600_000 + m * 60_000 + s * 1000 + ms))
}
