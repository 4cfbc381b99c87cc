//! Game service: the operations a client calls.
//!
//! [`GameService`] unifies local play and multi-client play behind one
//! interface. Both use the same pure transitions from
//! [`crate::game::state_machine`]; only the injected [`GameStore`] differs.
//!
//! Every mutating operation is a read-modify-write guarded by the record
//! version. A write that loses a race is retried against the fresh record up
//! to [`GameSettings::max_update_retries`] times before surfacing
//! [`GameError::Conflict`].
//!
//! ## Example
//!
//! ```
//! use morra::{
//!     GameService, PlayerId,
//!     commitment::{Salt, commit},
//!     game::{Card, Outcome, Prediction},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), morra::GameError> {
//! let service = GameService::in_memory();
//! let alice = PlayerId::new("alice");
//! let bob = PlayerId::new("bob");
//!
//! let id = service.create_game(&alice, 0).await?;
//! service.join_game(id, &bob).await?;
//!
//! let alice_salt = Salt::generate();
//! let bob_salt = Salt::generate();
//! let card = |v| Card::new(v).unwrap();
//! let guess = |v| Prediction::new(v).unwrap();
//! service.submit_move(id, &alice, commit(card(2), guess(4), &alice_salt)).await?;
//! service.submit_move(id, &bob, commit(card(2), guess(3), &bob_salt)).await?;
//!
//! service.reveal_move(id, &alice, 2, 4, &alice_salt).await?;
//! let game = service.reveal_move(id, &bob, 2, 3, &bob_salt).await?;
//! assert_eq!(game.winner, Some(Outcome::Winner(alice)));
//! # Ok(())
//! # }
//! ```

pub mod subscription;

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    commitment::{Commitment, Salt},
    game::{
        GameSettings,
        entities::{Card, GameId, GameRecord, PlayerId, Prediction},
        errors::{GameError, GameResult},
        state_machine::{self, GameEvent},
    },
    store::{GameStore, InMemoryGameStore, StoreError},
};

pub use subscription::Subscription;

/// Entry point for playing Morra against a [`GameStore`]
#[derive(Clone)]
pub struct GameService {
    store: Arc<dyn GameStore>,
    settings: GameSettings,
}

impl GameService {
    /// Create a new game service
    ///
    /// # Arguments
    ///
    /// * `store` - Where game records are kept
    /// * `settings` - Bet bounds and concurrency tunables
    pub fn new(store: Arc<dyn GameStore>, settings: GameSettings) -> Self {
        Self { store, settings }
    }

    /// Service over a fresh in-memory store with default settings
    pub fn in_memory() -> Self {
        let settings = GameSettings::default();
        let store = InMemoryGameStore::with_capacity(settings.subscriber_capacity);
        Self::new(Arc::new(store), settings)
    }

    /// Open a new game with `creator` in the first seat
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - Empty creator id
    /// * `GameError::InvalidBetAmount` - Bet outside the configured bounds
    pub async fn create_game(&self, creator: &PlayerId, bet_amount: u64) -> GameResult<GameId> {
        if creator.is_empty() {
            return Err(GameError::InvalidInput("player id is empty".to_string()));
        }
        if !self.settings.bet_in_range(bet_amount) {
            return Err(GameError::InvalidBetAmount {
                bet: bet_amount,
                min: self.settings.min_bet,
                max: self.settings.max_bet,
            });
        }

        let record = GameRecord::new(creator.clone(), bet_amount);
        let id = self.store.create(record).await?;

        info!("game {id}: {}", GameEvent::Created(creator.clone()));
        Ok(id)
    }

    /// Take the opponent seat
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - Unknown game
    /// * `GameError::AlreadyFull` - Opponent already seated
    /// * `GameError::CannotJoinOwnGame` - `player` is the creator
    pub async fn join_game(&self, id: GameId, player: &PlayerId) -> GameResult<GameRecord> {
        self.transition(id, |record| state_machine::join(record, player))
            .await
    }

    /// Submit a commitment for the caller's seat
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - Unknown game
    /// * `GameError::NotAPlayer` - `player` holds no seat
    /// * `GameError::GameNotInProgress` - No opponent yet, or game over
    /// * `GameError::CommitmentAlreadySubmitted` - Seat already committed
    pub async fn submit_move(
        &self,
        id: GameId,
        player: &PlayerId,
        commitment: Commitment,
    ) -> GameResult<GameRecord> {
        self.transition(id, |record| {
            state_machine::submit_move(record, player, commitment.clone())
        })
        .await
    }

    /// Reveal the caller's move; the second reveal completes the game
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - Card outside 1..=5 or prediction outside 1..=10
    /// * `GameError::NotFound` - Unknown game
    /// * `GameError::NotAllCommitted` - The other seat hasn't committed
    /// * `GameError::CommitmentMismatch` - Values don't hash to the commitment
    /// * `GameError::AlreadyRevealed` - Seat already revealed
    pub async fn reveal_move(
        &self,
        id: GameId,
        player: &PlayerId,
        card: u8,
        prediction: u8,
        salt: &Salt,
    ) -> GameResult<GameRecord> {
        let card = Card::new(card)?;
        let prediction = Prediction::new(prediction)?;

        self.transition(id, |record| {
            state_machine::reveal_move(record, player, card, prediction, salt)
        })
        .await
    }

    /// Current record for a game
    pub async fn get_game_state(&self, id: GameId) -> GameResult<GameRecord> {
        Ok(self.store.get(id).await?)
    }

    /// Raw change stream for async callers
    ///
    /// Only changes written after this call are delivered.
    pub async fn watch_game_state(&self, id: GameId) -> GameResult<broadcast::Receiver<GameRecord>> {
        Ok(self.store.subscribe(id).await?)
    }

    /// Call `callback` with the current record and again after every change
    ///
    /// # Returns
    ///
    /// * `GameResult<Subscription>` - Drop or `unsubscribe()` it to stop
    pub async fn subscribe_to_game_state<F>(&self, id: GameId, callback: F) -> GameResult<Subscription>
    where
        F: FnMut(GameRecord) + Send + 'static,
    {
        let rx = self.store.subscribe(id).await?;
        let initial = self.store.get(id).await?;
        Ok(Subscription::spawn(id, initial, rx, callback))
    }

    /// Read, apply `apply` to a copy, write back if nobody else wrote first.
    async fn transition<F>(&self, id: GameId, mut apply: F) -> GameResult<GameRecord>
    where
        F: FnMut(&mut GameRecord) -> GameResult<GameEvent>,
    {
        let mut attempt = 0;
        loop {
            let current = self.store.get(id).await?;
            let mut next = current.clone();
            let event = apply(&mut next)?;

            match self.store.update(next, current.version).await {
                Ok(stored) => {
                    match &event {
                        GameEvent::Completed(_) => info!("game {id}: {event}"),
                        _ => debug!("game {id}: {event}"),
                    }
                    return Ok(stored);
                }
                Err(StoreError::VersionConflict { .. }) if attempt < self.settings.max_update_retries => {
                    attempt += 1;
                    warn!("game {id}: concurrent write, retrying ({attempt})");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
