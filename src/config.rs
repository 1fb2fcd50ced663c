use std::path::PathBuf;

/// Application configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where finished games are appended.
    pub history_file: PathBuf,
    /// Whether finished games are written to the history file at all.
    pub record_games: bool,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            history_file: lookup("CHESS_HISTORY_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.history_file),
            record_games: lookup("CHESS_RECORD_GAMES")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.record_games),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            history_file: PathBuf::from("history.txt"),
            record_games: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
