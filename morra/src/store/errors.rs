//! Game store error types.

use thiserror::Error;

use crate::game::entities::GameId;

/// Game store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under this identifier
    #[error("game {0} not found")]
    NotFound(GameId),

    /// A record with this identifier already exists
    #[error("game {0} already exists")]
    AlreadyExists(GameId),

    /// The record changed since it was read
    #[error("game {id} version conflict: expected {expected}")]
    VersionConflict { id: GameId, expected: i64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
