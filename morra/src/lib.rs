//! # Morra
//!
//! A two-player Morra engine built around a commit-reveal state machine.
//!
//! Each player throws a card (1-5) and predicts the total of both cards
//! (1-10). Moves are first published as SHA-256 commitments and only revealed
//! once both players are bound, so neither side can react to the other's
//! move. A player wins if they alone predicted the total; otherwise the round
//! is a draw.
//!
//! ## Architecture
//!
//! A game moves through these phases:
//!
//! - **WaitingForOpponent**: The creator opened the game
//! - **Committing**: Both seats filled, commitments being collected
//! - **Revealing**: Both commitments stored, moves being disclosed and verified
//! - **Completed**: Both moves revealed, outcome recorded
//!
//! ## Core Modules
//!
//! - [`game`]: Entities, scoring rule and state transitions
//! - [`commitment`]: The commitment scheme
//! - [`store`]: Pluggable record storage with change notification
//! - [`service`]: The operations clients call
//! - [`db`]: PostgreSQL connection pooling
//!
//! ## Example
//!
//! ```
//! use morra::{GameService, PlayerId};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), morra::GameError> {
//! let service = GameService::in_memory();
//! let id = service.create_game(&PlayerId::new("alice"), 0).await?;
//! let game = service.get_game_state(id).await?;
//! assert_eq!(game.status, morra::GameStatus::Waiting);
//! # Ok(())
//! # }
//! ```

/// Commitment hashing for hidden moves.
pub mod commitment;

/// PostgreSQL connection pooling.
pub mod db;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    GameError, GameEvent, GameId, GamePhase, GameRecord, GameResult, GameSettings, GameStatus,
    Outcome, PlayerId, Role, constants, entities, functional, state_machine,
};

/// Game operations over an injectable store.
pub mod service;
pub use service::{GameService, Subscription};

/// Game record storage backends.
pub mod store;
pub use store::{GameStore, InMemoryGameStore, PgGameStore, StoreError};
