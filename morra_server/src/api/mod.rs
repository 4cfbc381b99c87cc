//! HTTP/WebSocket API for the Morra server.
//!
//! # Modules
//!
//! - [`games`]: Create, join, commit, reveal and read games
//! - [`websocket`]: Live record feed for one game
//! - [`request_id`]: `x-request-id` tagging for log correlation
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                         - Health check
//! POST /api/v1/games                   - Create game
//! GET  /api/v1/games/{id}              - Get game
//! POST /api/v1/games/{id}/join         - Join game
//! POST /api/v1/games/{id}/commit       - Commit a move
//! POST /api/v1/games/{id}/reveal       - Reveal a move
//! GET  /ws/{id}                        - WebSocket feed
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use morra::GameService;
//! use morra_server::api::{AppState, create_router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_router(AppState::new(GameService::in_memory()));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development.

pub mod games;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use morra::{GameService, db::Database};
use serde_json::json;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub service: GameService,
    /// Present when games live in PostgreSQL; probed by `/health`
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(service: GameService) -> Self {
        Self {
            service,
            database: None,
        }
    }

    pub fn with_database(service: GameService, database: Database) -> Self {
        Self {
            service,
            database: Some(database),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/{game_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/games", post(games::create_game))
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/join", post(games::join_game))
        .route("/games/{game_id}/commit", post(games::commit_move))
        .route("/games/{game_id}/reveal", post(games::reveal_move))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store is reachable, `503 Service Unavailable`
/// otherwise. The in-memory store is always reachable.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","store":"memory","database":null,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (store, db_healthy) = match &state.database {
        Some(db) => ("postgres", Some(db.health_check().await.is_ok())),
        None => ("memory", None),
    };

    let healthy = db_healthy.unwrap_or(true);
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
