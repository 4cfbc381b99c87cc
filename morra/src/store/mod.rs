//! Game store: where game records live between transitions.
//!
//! The store is an injectable collaborator. [`GameService`](crate::service::GameService)
//! only talks to the [`GameStore`] trait, so the same game logic runs against
//! the in-memory map in tests and local play, or against PostgreSQL when
//! several server processes share games.
//!
//! ## Concurrency
//!
//! Every record carries a `version`. [`GameStore::update`] only succeeds when
//! the stored version still equals the version the caller read, and bumps it
//! by one. Two players racing to write the same game can therefore never
//! silently overwrite each other; the loser gets
//! [`StoreError::VersionConflict`] and re-reads.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::game::entities::{GameId, GameRecord};

pub mod errors;
pub mod hub;
pub mod memory;
pub mod postgres;

pub use errors::{StoreError, StoreResult};
pub use hub::ChangeHub;
pub use memory::InMemoryGameStore;
pub use postgres::{PgGameStore, ReconnectPolicy};

/// Trait for game record storage with change notification
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Insert a new record
    async fn create(&self, record: GameRecord) -> StoreResult<GameId>;

    /// Load the current record
    async fn get(&self, id: GameId) -> StoreResult<GameRecord>;

    /// Replace the record if its stored version is still `expected_version`
    ///
    /// Returns the record as stored, with its new version.
    async fn update(&self, record: GameRecord, expected_version: i64) -> StoreResult<GameRecord>;

    /// Receive every record written for `id` after this call
    async fn subscribe(&self, id: GameId) -> StoreResult<broadcast::Receiver<GameRecord>>;
}
