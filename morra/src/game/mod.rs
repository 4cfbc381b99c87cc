//! Morra game engine - entities, scoring and the commit-reveal state machine.
//!
//! This module provides:
//! - Validated game entities (cards, predictions, player ids, the game record)
//! - The pure winner-determination rule
//! - State transitions for join, commit and reveal
//! - Game settings

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod settings;
pub mod state_machine;

pub use entities::{
    Card, GameId, GamePhase, GameRecord, GameStatus, Outcome, PlayerId, PlayerMove, Prediction,
    Role,
};
pub use errors::{GameError, GameResult};
pub use settings::GameSettings;
pub use state_machine::GameEvent;
