//! Callback-driven game subscriptions.

use log::warn;
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use crate::game::entities::{GameId, GameRecord};

/// Live subscription to one game's changes.
///
/// The callback runs on a background task until [`Subscription::unsubscribe`]
/// is called or the subscription is dropped.
#[derive(Debug)]
pub struct Subscription {
    game_id: GameId,
    task: JoinHandle<()>,
}

impl Subscription {
    pub(super) fn spawn<F>(
        game_id: GameId,
        initial: GameRecord,
        mut rx: broadcast::Receiver<GameRecord>,
        mut callback: F,
    ) -> Self
    where
        F: FnMut(GameRecord) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut last_version = initial.version;
            callback(initial);

            loop {
                match rx.recv().await {
                    // Writes that landed between subscribe and the initial read
                    Ok(record) if record.version <= last_version => {}
                    Ok(record) => {
                        last_version = record.version;
                        callback(record);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("subscriber of game {game_id} skipped {skipped} updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self { game_id, task }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Stop delivering changes.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
