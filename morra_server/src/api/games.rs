//! Game API handlers.
//!
//! Thin JSON wrappers over [`GameService`](morra::GameService). Every move
//! names the acting player in the body; the service resolves their seat.
//!
//! # Examples
//!
//! Create a game:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/games \
//!   -H "Content-Type: application/json" \
//!   -d '{"creator": "alice", "bet_amount": 100}'
//! ```
//!
//! Commit a move:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/games/$ID/commit \
//!   -H "Content-Type: application/json" \
//!   -d '{"player": "alice", "commitment": "9f86d0..."}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use morra::{
    GameError, GameId, GameRecord, PlayerId,
    commitment::{Commitment, Salt},
    constants::{MAX_CARD, MAX_PREDICTION, MIN_CARD, MIN_PREDICTION},
};
use serde::{Deserialize, Serialize};

use super::{AppState, request_id::RequestId};
use crate::logging::log_rejected_operation;

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub creator: PlayerId,
    pub bet_amount: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateGameResponse {
    pub id: GameId,
}

#[derive(Debug, Deserialize)]
pub struct JoinGameRequest {
    pub player: PlayerId,
}

#[derive(Debug, Deserialize)]
pub struct CommitMoveRequest {
    pub player: PlayerId,
    /// Hex SHA-256 of `"{card}:{prediction}:{salt}"`
    pub commitment: String,
}

#[derive(Debug, Deserialize)]
pub struct RevealMoveRequest {
    pub player: PlayerId,
    /// Wide so any JSON integer reaches the range check and gets a 400
    pub card: i64,
    pub prediction: i64,
    pub salt: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error body plus the status it maps to
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

/// HTTP status for a game error
pub fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::NotFound(_) => StatusCode::NOT_FOUND,
        GameError::AlreadyFull
        | GameError::CannotJoinOwnGame
        | GameError::CommitmentAlreadySubmitted
        | GameError::AlreadyRevealed
        | GameError::GameNotInProgress
        | GameError::NotAllCommitted
        | GameError::Conflict(_) => StatusCode::CONFLICT,
        GameError::InvalidInput(_) | GameError::InvalidBetAmount { .. } => StatusCode::BAD_REQUEST,
        GameError::CommitmentMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::NotAPlayer => StatusCode::FORBIDDEN,
        GameError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self {
            status: status_for(&err),
            message: err.client_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Log a failed operation and turn it into a response.
///
/// Store failures are logged in full; the client only sees the sanitized message.
fn reject(
    operation: &str,
    game_id: Option<GameId>,
    request_id: &RequestId,
    err: GameError,
) -> ApiError {
    if let GameError::Store(_) = err {
        tracing::error!(request_id = %request_id, operation = operation, "Store failure: {}", err);
    }
    let api_err = ApiError::from(err);
    log_rejected_operation(operation, game_id, &api_err.message);
    api_err
}

/// Open a new game.
///
/// # Response
///
/// Returns `201 Created` with `{"id": "<uuid>"}`.
///
/// # Errors
///
/// - `400 Bad Request`: Empty creator or bet outside the configured range
pub async fn create_game(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), ApiError> {
    let id = state
        .service
        .create_game(&request.creator, request.bet_amount)
        .await
        .map_err(|e| reject("create", None, &request_id, e))?;

    Ok((StatusCode::CREATED, Json(CreateGameResponse { id })))
}

/// Current record of a game.
///
/// # Errors
///
/// - `404 Not Found`: Unknown game
pub async fn get_game(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<GameId>,
) -> Result<Json<GameRecord>, ApiError> {
    state
        .service
        .get_game_state(id)
        .await
        .map(Json)
        .map_err(|e| reject("get", Some(id), &request_id, e))
}

/// Take the opponent seat.
///
/// # Errors
///
/// - `404 Not Found`: Unknown game
/// - `409 Conflict`: Game already has an opponent, or the creator tried to join
pub async fn join_game(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<GameId>,
    Json(request): Json<JoinGameRequest>,
) -> Result<Json<GameRecord>, ApiError> {
    state
        .service
        .join_game(id, &request.player)
        .await
        .map(Json)
        .map_err(|e| reject("join", Some(id), &request_id, e))
}

/// Submit the caller's commitment.
///
/// # Errors
///
/// - `400 Bad Request`: Commitment isn't 64 hex characters
/// - `403 Forbidden`: Caller holds no seat
/// - `409 Conflict`: Not in progress, or already committed
pub async fn commit_move(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<GameId>,
    Json(request): Json<CommitMoveRequest>,
) -> Result<Json<GameRecord>, ApiError> {
    let commitment = Commitment::parse(&request.commitment).map_err(|e| {
        log_rejected_operation("commit", Some(id), &e.to_string());
        ApiError::bad_request(e.to_string())
    })?;

    state
        .service
        .submit_move(id, &request.player, commitment)
        .await
        .map(Json)
        .map_err(|e| reject("commit", Some(id), &request_id, e))
}

/// Reveal the caller's move. The second reveal completes the game.
///
/// # Errors
///
/// - `400 Bad Request`: Card or prediction out of range
/// - `409 Conflict`: Opponent hasn't committed, or already revealed
/// - `422 Unprocessable Entity`: Values don't match the commitment
pub async fn reveal_move(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<GameId>,
    Json(request): Json<RevealMoveRequest>,
) -> Result<Json<GameRecord>, ApiError> {
    let card = in_range("card", request.card, MIN_CARD, MAX_CARD)
        .map_err(|e| reject("reveal", Some(id), &request_id, e))?;
    let prediction = in_range("prediction", request.prediction, MIN_PREDICTION, MAX_PREDICTION)
        .map_err(|e| reject("reveal", Some(id), &request_id, e))?;
    let salt = Salt::new(&request.salt);

    state
        .service
        .reveal_move(id, &request.player, card, prediction, &salt)
        .await
        .map(Json)
        .map_err(|e| reject("reveal", Some(id), &request_id, e))
}

/// Narrow a JSON integer to `min..=max`.
fn in_range(field: &str, value: i64, min: u8, max: u8) -> Result<u8, GameError> {
    u8::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| GameError::InvalidInput(format!("{field} {value} outside {min}..={max}")))
}
