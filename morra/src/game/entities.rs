use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{
    constants::{MAX_CARD, MAX_PLAYER_ID_LENGTH, MAX_PREDICTION, MIN_CARD, MIN_PREDICTION},
    errors::{GameError, GameResult},
};
use crate::commitment::Commitment;

/// Unique identifier of a single game record.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GameId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identity of a player, usually a wallet address.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        let mut id: String = s.trim().chars().filter(|c| !c.is_control()).collect();
        if let Some((idx, _)) = id.char_indices().nth(MAX_PLAYER_ID_LENGTH) {
            id.truncate(idx);
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A thrown card, always within `MIN_CARD..=MAX_CARD`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Card(u8);

impl Card {
    pub fn new(value: u8) -> GameResult<Self> {
        if (MIN_CARD..=MAX_CARD).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GameError::InvalidInput(format!(
                "card {value} outside {MIN_CARD}..={MAX_CARD}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A predicted total, always within `MIN_PREDICTION..=MAX_PREDICTION`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Prediction(u8);

impl Prediction {
    pub fn new(value: u8) -> GameResult<Self> {
        if (MIN_PREDICTION..=MAX_PREDICTION).contains(&value) {
            Ok(Self(value))
        } else {
            Err(GameError::InvalidInput(format!(
                "prediction {value} outside {MIN_PREDICTION}..={MAX_PREDICTION}"
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Prediction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Coarse lifecycle status stored on the record.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Completed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

/// Finer-grained view of where a game is in its round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    WaitingForOpponent,
    Committing,
    Revealing,
    Completed,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForOpponent => "waiting for opponent",
            Self::Committing => "committing",
            Self::Revealing => "revealing",
            Self::Completed => "completed",
        };
        write!(f, "{repr}")
    }
}

/// Which seat a player occupies in a game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Creator,
    Opponent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Creator => "creator",
            Self::Opponent => "opponent",
        };
        write!(f, "{repr}")
    }
}

/// Result of a completed round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winner(player) => write!(f, "{player} won"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// One role's move: the commitment first, then the revealed values.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerMove {
    pub commitment: Option<Commitment>,
    pub card: Option<Card>,
    pub prediction: Option<Prediction>,
}

impl PlayerMove {
    pub fn is_committed(&self) -> bool {
        self.commitment.is_some()
    }

    pub fn is_revealed(&self) -> bool {
        self.card.is_some()
    }
}

/// The single persisted entity: everything known about one game.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameRecord {
    pub id: GameId,
    pub creator: PlayerId,
    pub opponent: Option<PlayerId>,
    pub bet_amount: u64,
    pub creator_move: PlayerMove,
    pub opponent_move: PlayerMove,
    pub status: GameStatus,
    pub winner: Option<Outcome>,
    /// Write counter maintained by the store. Transitions never touch it.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub last_action_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn new(creator: PlayerId, bet_amount: u64) -> Self {
        let now = Utc::now();
        Self {
            id: GameId::new(),
            creator,
            opponent: None,
            bet_amount,
            creator_move: PlayerMove::default(),
            opponent_move: PlayerMove::default(),
            status: GameStatus::Waiting,
            winner: None,
            version: 0,
            created_at: now,
            last_action_at: now,
        }
    }

    /// Resolve which seat `player` holds, if any.
    pub fn role_of(&self, player: &PlayerId) -> Option<Role> {
        if &self.creator == player {
            Some(Role::Creator)
        } else if self.opponent.as_ref() == Some(player) {
            Some(Role::Opponent)
        } else {
            None
        }
    }

    pub fn player_move_mut(&mut self, role: Role) -> &mut PlayerMove {
        match role {
            Role::Creator => &mut self.creator_move,
            Role::Opponent => &mut self.opponent_move,
        }
    }

    pub fn both_committed(&self) -> bool {
        self.creator_move.is_committed() && self.opponent_move.is_committed()
    }

    pub fn phase(&self) -> GamePhase {
        match self.status {
            GameStatus::Waiting => GamePhase::WaitingForOpponent,
            GameStatus::Completed => GamePhase::Completed,
            GameStatus::InProgress if self.both_committed() => GamePhase::Revealing,
            GameStatus::InProgress => GamePhase::Committing,
        }
    }
}
