use time::format_description::parse;
use tracing_subscriber::fmt::time::OffsetTime;

use crate::cli::Commands;

pub fn setup_tracing_for_command(command: &Option<Commands>, server_log_level: &str) {
    // RUST_LOG, when set, overrides the per-command default
    let default_level = match command {
        Some(Commands::Check { .. }) => "warn",
        Some(Commands::Version) => "error",
        Some(Commands::Serve { .. }) | None => server_log_level,
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let timer = parse("[hour]:[minute]:[second].[subsecond digits:2]")
        .map(|format| {
            OffsetTime::new(
                time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC),
                format,
            )
        });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_ansi(true);

    match timer {
        Ok(timer) => builder.with_timer(timer).compact().init(),
        Err(_) => builder.compact().init(),
    }
}
