//! Wall-clock time spent on the current game.

use std::time::{Duration, Instant};

/// Runs from game start until the game ends.
#[derive(Clone, Copy, Debug)]
pub struct GameClock {
    started: Instant,
    stopped_after: Option<Duration>,
}

impl GameClock {
    /// A clock that starts running now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stopped_after: None,
        }
    }

    /// Freeze the elapsed time. Stopping twice keeps the first reading.
    pub fn stop(&mut self) {
        if self.stopped_after.is_none() {
            self.stopped_after = Some(self.started.elapsed());
        }
    }

    /// Continue a stopped clock from the time it showed when stopped.
    pub fn resume(&mut self) {
        if let Some(shown) = self.stopped_after.take() {
            let now = Instant::now();
            self.started = now.checked_sub(shown).unwrap_or(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.stopped_after.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped_after.unwrap_or_else(|| self.started.elapsed())
    }

    /// `elapsed()` as `HH:mm:ss:SSS`.
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::start()
    }
}

/// Format a duration as `HH:mm:ss:SSS`. Hours are not wrapped at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}:{millis:03}")
}
