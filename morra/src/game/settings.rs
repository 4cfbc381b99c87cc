//! Game configuration.

use serde::{Deserialize, Serialize};

use super::constants::{
    DEFAULT_MAX_BET, DEFAULT_MAX_UPDATE_RETRIES, DEFAULT_MIN_BET, DEFAULT_SUBSCRIBER_CAPACITY,
};

/// Tunables shared by every game a service hosts
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameSettings {
    /// Smallest accepted bet
    pub min_bet: u64,

    /// Largest accepted bet
    pub max_bet: u64,

    /// Times a transition is retried after losing a version race
    pub max_update_retries: u32,

    /// Records buffered per subscriber before it starts skipping
    pub subscriber_capacity: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(
            DEFAULT_MIN_BET,
            DEFAULT_MAX_BET,
            DEFAULT_MAX_UPDATE_RETRIES,
            DEFAULT_SUBSCRIBER_CAPACITY,
        )
    }
}

impl GameSettings {
    #[must_use]
    pub const fn new(
        min_bet: u64,
        max_bet: u64,
        max_update_retries: u32,
        subscriber_capacity: usize,
    ) -> Self {
        Self {
            min_bet,
            max_bet,
            max_update_retries,
            subscriber_capacity,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_bet < self.min_bet {
            return Err("Max bet must not be less than min bet".to_string());
        }

        if self.subscriber_capacity == 0 {
            return Err("Subscriber capacity must be at least 1".to_string());
        }

        Ok(())
    }

    pub fn bet_in_range(&self, bet: u64) -> bool {
        (self.min_bet..=self.max_bet).contains(&bet)
    }
}
