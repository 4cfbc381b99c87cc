//! Structured logging configuration.
//!
//! The `morra` library logs through the `log` facade; `init` installs a
//! tracing subscriber that also captures those records.

use morra::{GameId, GameRecord};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use morra_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // `init` also installs the `log` -> `tracing` bridge.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a game operation rejected by the rules
///
/// # Arguments
///
/// * `operation` - Operation name
/// * `game_id` - Target game, if the request named one
/// * `message` - Client-facing error message
pub fn log_rejected_operation(operation: &str, game_id: Option<GameId>, message: &str) {
    tracing::debug!(
        operation = operation,
        game_id = game_id.map(|id| id.to_string()),
        "Rejected: {}",
        message
    );
}

/// Log a state snapshot pushed to a WebSocket watcher
pub fn log_pushed_state(record: &GameRecord) {
    tracing::trace!(
        game_id = %record.id,
        version = record.version,
        status = ?record.status,
        "Pushed game state"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use morra::PlayerId;

    #[test]
    fn test_log_rejected_operation() {
        log_rejected_operation("join", Some(GameId::new()), "game already has an opponent");
        log_rejected_operation("create", None, "bet outside range");
    }

    #[test]
    fn test_log_pushed_state() {
        log_pushed_state(&GameRecord::new(PlayerId::new("alice"), 10));
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
