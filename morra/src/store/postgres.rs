//! PostgreSQL-backed game store.
//!
//! Each game is one row holding the record as JSONB next to its version.
//! Writes are compare-and-swap on the version column and announce the game
//! id on the `morra_games` notification channel, so stores in other processes
//! can forward the change to their own subscribers.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use log::{debug, error, info, warn};
use sqlx::{PgPool, Row, postgres::PgListener};
use std::{sync::Arc, time::Duration};
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use super::{
    GameStore,
    errors::{StoreError, StoreResult},
    hub::ChangeHub,
};
use crate::game::{
    constants::DEFAULT_SUBSCRIBER_CAPACITY,
    entities::{GameId, GameRecord},
};

/// Notification channel carrying `"{origin}:{game_id}"` payloads.
pub const NOTIFY_CHANNEL: &str = "morra_games";

/// Game store backed by a `games` table
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
    hub: Arc<ChangeHub>,
    /// Tags our own notifications so the listener can skip them.
    origin: Uuid,
}

impl PgGameStore {
    /// Create a new store
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self::with_capacity(pool, DEFAULT_SUBSCRIBER_CAPACITY)
    }

    pub fn with_capacity(pool: PgPool, subscriber_capacity: usize) -> Self {
        Self {
            pool,
            hub: Arc::new(ChangeHub::new(subscriber_capacity)),
            origin: Uuid::new_v4(),
        }
    }

    /// Create the `games` table if it doesn't exist yet
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id UUID PRIMARY KEY,
                version BIGINT NOT NULL,
                record JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Forward changes made by other processes to local subscribers
    ///
    /// A dropped connection is re-established according to `policy`, after
    /// which every watched game is republished since notifications sent in
    /// the gap are lost. If the policy gives up, local subscriptions are
    /// closed rather than left silent.
    ///
    /// # Returns
    ///
    /// * `StoreResult<JoinHandle<()>>` - Handle of the listener task
    pub async fn spawn_listener(&self, policy: ReconnectPolicy) -> StoreResult<JoinHandle<()>> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        let store = self.clone();
        Ok(tokio::spawn(async move {
            forward_changes(listener, store.origin, &store, &store.hub, policy).await;
        }))
    }
}

/// How the change listener retries a lost connection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Ceiling for the doubling delay
    pub max_backoff: Duration,
    /// Consecutive failed attempts before giving up; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

/// Source of raw notification payloads.
#[async_trait]
trait ChangeFeed: Send {
    /// Next payload, or `None` when the connection dropped.
    async fn next_payload(&mut self) -> Result<Option<String>, sqlx::Error>;

    /// Re-establish the connection and its channel subscriptions.
    async fn reconnect(&mut self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl ChangeFeed for PgListener {
    async fn next_payload(&mut self) -> Result<Option<String>, sqlx::Error> {
        Ok(self
            .try_recv()
            .await?
            .map(|notification| notification.payload().to_string()))
    }

    async fn reconnect(&mut self) -> Result<(), sqlx::Error> {
        // Any query reconnects and re-issues LISTEN for known channels.
        sqlx::query("SELECT 1").execute(&mut *self).await?;
        Ok(())
    }
}

/// Parse a notification payload, skipping ones `origin` sent itself.
fn foreign_game_id(origin: Uuid, payload: &str) -> Option<GameId> {
    let (sender, id) = payload.split_once(':')?;
    if sender == origin.to_string() {
        return None;
    }
    id.parse().ok()
}

async fn forward_changes<F: ChangeFeed>(
    mut feed: F,
    origin: Uuid,
    records: &dyn GameStore,
    hub: &ChangeHub,
    policy: ReconnectPolicy,
) {
    loop {
        match feed.next_payload().await {
            Ok(Some(payload)) => {
                if let Some(id) = foreign_game_id(origin, &payload) {
                    republish(records, hub, id).await;
                }
                continue;
            }
            Ok(None) => warn!("Game listener lost its connection"),
            Err(e) => warn!("Game listener failed: {}", e),
        }

        if !reconnect(&mut feed, &policy).await {
            error!("Game listener gave up reconnecting, closing subscriptions");
            hub.close_all().await;
            return;
        }

        let watched = hub.watched_games().await;
        info!("Game listener reconnected, resyncing {} game(s)", watched.len());
        for id in watched {
            republish(records, hub, id).await;
        }
    }
}

/// Retry `feed.reconnect()` with doubling backoff. False once the policy gives up.
async fn reconnect<F: ChangeFeed>(feed: &mut F, policy: &ReconnectPolicy) -> bool {
    let mut delay = policy.initial_backoff;
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match feed.reconnect().await {
            Ok(()) => return true,
            Err(e) => warn!("Game listener reconnect attempt {} failed: {}", attempt, e),
        }

        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            return false;
        }
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(policy.max_backoff);
    }
}

async fn republish(records: &dyn GameStore, hub: &ChangeHub, id: GameId) {
    match records.get(id).await {
        Ok(record) => hub.publish(&record).await,
        Err(e) => warn!("Failed to load notified game {}: {}", id, e),
    }
}

fn decode(row: &sqlx::postgres::PgRow) -> StoreResult<GameRecord> {
    let value: serde_json::Value = row.get("record");
    let mut record: GameRecord = serde_json::from_value(value)?;
    record.version = row.get("version");
    Ok(record)
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn create(&self, record: GameRecord) -> StoreResult<GameId> {
        let id = record.id;
        let value = serde_json::to_value(&record)?;

        let result = sqlx::query(
            r#"
            INSERT INTO games (id, version, record)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.version)
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(id));
        }
        Ok(id)
    }

    async fn get(&self, id: GameId) -> StoreResult<GameRecord> {
        let row = sqlx::query("SELECT version, record FROM games WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        decode(&row)
    }

    async fn update(&self, mut record: GameRecord, expected_version: i64) -> StoreResult<GameRecord> {
        let id = record.id;
        record.version = expected_version + 1;
        let value = serde_json::to_value(&record)?;

        let mut tx = self.pool.begin().await?;

        // Version check and write in one statement
        let updated = sqlx::query(
            r#"
            UPDATE games
            SET record = $3, version = $2 + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected_version)
        .bind(value)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM games WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => StoreError::VersionConflict {
                    id,
                    expected: expected_version,
                },
                None => StoreError::NotFound(id),
            });
        }

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NOTIFY_CHANNEL)
            .bind(format!("{}:{}", self.origin, id))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("game {} stored at version {}", id, record.version);

        self.hub.publish(&record).await;
        Ok(record)
    }

    async fn subscribe(&self, id: GameId) -> StoreResult<broadcast::Receiver<GameRecord>> {
        let exists = sqlx::query("SELECT 1 FROM games WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.hub.subscribe(id).await)
    }
}
