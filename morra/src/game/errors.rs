//! Game error types.

use thiserror::Error;

use super::entities::GameId;
use crate::store::StoreError;

/// Errors returned by game transitions and the game service
#[derive(Debug, Error)]
pub enum GameError {
    /// The game identifier does not resolve to a record
    #[error("game {0} not found")]
    NotFound(GameId),

    /// Join attempted on a game that already has an opponent
    #[error("game already has an opponent")]
    AlreadyFull,

    /// The creator tried to join their own game
    #[error("can't join your own game")]
    CannotJoinOwnGame,

    /// Card, prediction or player identifier out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bet outside the configured bounds
    #[error("bet {bet} outside {min}..={max}")]
    InvalidBetAmount { bet: u64, min: u64, max: u64 },

    /// Revealed values do not hash to the stored commitment
    #[error("revealed move does not match the commitment")]
    CommitmentMismatch,

    /// The role already has a commitment for this round
    #[error("move already committed")]
    CommitmentAlreadySubmitted,

    /// The role already revealed its move
    #[error("move already revealed")]
    AlreadyRevealed,

    /// Caller is neither the creator nor the opponent
    #[error("not a player in this game")]
    NotAPlayer,

    /// Move submitted while waiting for an opponent or after completion
    #[error("game is not in progress")]
    GameNotInProgress,

    /// Reveal attempted before both players committed
    #[error("both players must commit before revealing")]
    NotAllCommitted,

    /// Concurrent writers kept winning the race for this record
    #[error("game {0} was modified concurrently, try again")]
    Conflict(GameId),

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for GameError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => GameError::NotFound(id),
            StoreError::VersionConflict { id, .. } => GameError::Conflict(id),
            other => GameError::Store(other),
        }
    }
}

impl GameError {
    /// Message safe to hand to a remote client.
    ///
    /// Store errors are collapsed so backend details never leave the process.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
