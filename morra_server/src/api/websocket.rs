//! WebSocket feed of game state.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{game_id}`
//! 2. Server subscribes to the game; unknown games get `404` before the upgrade
//! 3. The current record is pushed immediately, then again after every change
//! 4. On disconnect the subscription is dropped
//!
//! The feed is read-only. Moves go through the HTTP API so each one gets a
//! status code.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/6f1c...');
//! ws.onmessage = (event) => render(JSON.parse(event.data));
//! ```

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info};
use morra::{GameId, GameRecord, Subscription};
use tokio::sync::mpsc;

use super::{AppState, games::ApiError};
use crate::logging::log_pushed_state;

/// Upgrade to a WebSocket that streams one game's records.
///
/// # Response
///
/// `101 Switching Protocols` on success, `404 Not Found` for an unknown game.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(game_id): Path<GameId>,
    State(state): State<AppState>,
) -> Response {
    let (tx, rx) = mpsc::unbounded_channel::<GameRecord>();

    let subscription = match state
        .service
        .subscribe_to_game_state(game_id, move |record| {
            // Receiver gone means the socket is closing.
            let _ = tx.send(record);
        })
        .await
    {
        Ok(subscription) => subscription,
        Err(e) => return ApiError::from(e).into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, subscription, rx))
}

/// Pump records into the socket until either side hangs up.
async fn handle_socket(
    socket: WebSocket,
    subscription: Subscription,
    mut updates: mpsc::UnboundedReceiver<GameRecord>,
) {
    let game_id = subscription.game_id();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: game={}", game_id);

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(record) = update else {
                    break;
                };

                let json = match serde_json::to_string(&record) {
                    Ok(j) => j,
                    Err(e) => {
                        error!("Failed to serialize game {}: {}", game_id, e);
                        continue;
                    }
                };

                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
                log_pushed_state(&record);
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Text(text))) => {
                        debug!("Ignoring client message on game {}: {}", game_id, text.as_str());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket error on game {}: {}", game_id, e);
                        break;
                    }
                }
            }
        }
    }

    subscription.unsubscribe();
    info!("WebSocket disconnected: game={}", game_id);
}
