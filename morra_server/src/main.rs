//! Morra game server.
//!
//! Hosts a `GameService` over HTTP and WebSocket, backed by either an
//! in-memory store or PostgreSQL.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use morra::{
    GameService, InMemoryGameStore, PgGameStore, db::Database, store::ReconnectPolicy,
};
use morra_server::{
    api,
    config::{ServerConfig, StoreBackend},
    logging,
};
use pico_args::Arguments;
use tracing::{info, warn};

const HELP: &str = "\
Run a Morra game server

USAGE:
  morra_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --store      BACKEND     memory or postgres          [default: env MORRA_STORE or memory]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL                 PostgreSQL connection string
  MORRA_STORE                  Store backend
  MORRA_MIN_BET                Smallest accepted bet
  MORRA_MAX_BET                Largest accepted bet
  MORRA_MAX_UPDATE_RETRIES     Retries after a concurrent write
  MORRA_SUBSCRIBER_CAPACITY    Updates buffered per subscriber
  RUST_LOG                     Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        store: pargs.opt_value_from_str("--store")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.store)?;
    info!("Starting Morra server at {} ({} store)", config.bind, config.store);

    let state = match &config.database {
        None => {
            let store = InMemoryGameStore::with_capacity(config.game.subscriber_capacity);
            api::AppState::new(GameService::new(Arc::new(store), config.game.clone()))
        }
        Some(db_config) => {
            info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;

            let store = PgGameStore::with_capacity(db.pool().clone(), config.game.subscriber_capacity);
            store.migrate().await.context("Failed to create games table")?;

            // Detached; it reconnects on its own and only ends if it gives up.
            let _listener = store
                .spawn_listener(ReconnectPolicy::default())
                .await
                .context("Failed to listen for game changes")?;
            info!("Database connected successfully");

            api::AppState::with_database(GameService::new(Arc::new(store), config.game.clone()), db)
        }
    };

    let database = state.database.clone();
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
