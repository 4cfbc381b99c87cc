//! Per-game change fan-out shared by the store backends.

use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};

use crate::game::entities::{GameId, GameRecord};

/// Broadcast channels keyed by game, created on first subscription.
#[derive(Debug)]
pub struct ChangeHub {
    channels: RwLock<HashMap<GameId, broadcast::Sender<GameRecord>>>,
    capacity: usize,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Receive every record published for `id` from now on.
    pub async fn subscribe(&self, id: GameId) -> broadcast::Receiver<GameRecord> {
        let mut channels = self.channels.write().await;
        channels
            .entry(id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Push `record` to its subscribers. Channels nobody listens to are dropped.
    pub async fn publish(&self, record: &GameRecord) {
        let mut channels = self.channels.write().await;
        if let Some(sender) = channels.get(&record.id) {
            if sender.send(record.clone()).is_err() {
                channels.remove(&record.id);
            }
        }
    }

    /// Games that currently have at least one live subscriber.
    pub async fn watched_games(&self) -> Vec<GameId> {
        let channels = self.channels.read().await;
        channels
            .iter()
            .filter(|(_, sender)| sender.receiver_count() > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Drop every channel so current subscribers see `RecvError::Closed`.
    pub async fn close_all(&self) {
        self.channels.write().await.clear();
    }

    /// Number of live subscribers for `id`.
    pub async fn subscriber_count(&self, id: GameId) -> usize {
        let channels = self.channels.read().await;
        channels.get(&id).map_or(0, broadcast::Sender::receiver_count)
    }
}
