//! In-process game store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};

use super::{
    GameStore,
    errors::{StoreError, StoreResult},
    hub::ChangeHub,
};
use crate::game::{
    constants::DEFAULT_SUBSCRIBER_CAPACITY,
    entities::{GameId, GameRecord},
};

/// Game records held in a map guarded by a single lock.
///
/// Useful for tests, local play and single-process servers. Records vanish
/// when the store is dropped.
#[derive(Debug)]
pub struct InMemoryGameStore {
    games: RwLock<HashMap<GameId, GameRecord>>,
    hub: ChangeHub,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Create a store whose subscribers buffer `subscriber_capacity` records.
    pub fn with_capacity(subscriber_capacity: usize) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            hub: ChangeHub::new(subscriber_capacity),
        }
    }
}

impl Default for InMemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn create(&self, record: GameRecord) -> StoreResult<GameId> {
        let id = record.id;
        let mut games = self.games.write().await;
        if games.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        games.insert(id, record);
        Ok(id)
    }

    async fn get(&self, id: GameId) -> StoreResult<GameRecord> {
        let games = self.games.read().await;
        games.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, mut record: GameRecord, expected_version: i64) -> StoreResult<GameRecord> {
        let id = record.id;
        let mut games = self.games.write().await;
        let current = games.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                id,
                expected: expected_version,
            });
        }

        record.version = expected_version + 1;
        *current = record.clone();
        drop(games);

        self.hub.publish(&record).await;
        Ok(record)
    }

    async fn subscribe(&self, id: GameId) -> StoreResult<broadcast::Receiver<GameRecord>> {
        if !self.games.read().await.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.hub.subscribe(id).await)
    }
}
