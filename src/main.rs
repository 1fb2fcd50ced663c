use std::io;

use hotseat_chess::cli::Session;
use hotseat_chess::config::AppConfig;

fn main() -> io::Result<()> {
    // Logs go to stderr so the board and prompts own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotseat_chess=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        history_file = %config.history_file.display(),
        record_games = config.record_games,
        "hotseat-chess v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let stdout = io::stdout();
    let mut session = Session::new(config, stdout.lock());
    session.run(io::stdin().lock())
}
