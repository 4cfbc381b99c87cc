//! Commitment scheme binding a hidden card, prediction and salt.
//!
//! A commitment is the lowercase hex SHA-256 digest of the text
//! `"{card}:{prediction}:{salt}"`. Players publish the commitment first and
//! disclose the three inputs later; the game recomputes the digest on reveal.

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::game::entities::{Card, Prediction};

/// Length in hex characters of a SHA-256 digest.
pub const COMMITMENT_HEX_LEN: usize = 64;

/// Bytes of randomness in a generated salt.
pub const SALT_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("commitment must be {COMMITMENT_HEX_LEN} hex characters")]
    InvalidFormat,
}

/// Opaque digest published before the move is revealed.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Commitment(String);

impl Commitment {
    /// Derive the commitment for a move.
    pub fn new(card: Card, prediction: Prediction, salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{card}:{prediction}:{salt}").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept a commitment computed elsewhere, e.g. by a browser client.
    pub fn parse(s: &str) -> Result<Self, CommitmentError> {
        let s = s.trim().to_ascii_lowercase();
        if s.len() != COMMITMENT_HEX_LEN || hex::decode(&s).is_err() {
            return Err(CommitmentError::InvalidFormat);
        }
        Ok(Self(s))
    }

    /// Whether the revealed values hash to this commitment.
    pub fn verify(&self, card: Card, prediction: Prediction, salt: &Salt) -> bool {
        Self::new(card, prediction, salt) == *self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for Commitment {
    type Err = CommitmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Secret mixed into a commitment so the move can't be brute-forced from it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Salt(String);

impl Salt {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    /// Random hex salt for callers that don't bring their own.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Salt {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Free-function form of [`Commitment::new`].
pub fn commit(card: Card, prediction: Prediction, salt: &Salt) -> Commitment {
    Commitment::new(card, prediction, salt)
}
