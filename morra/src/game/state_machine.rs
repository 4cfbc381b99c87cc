//! Morra game state machine.
//!
//! Transitions are pure functions over a [`GameRecord`]. They validate the
//! move against the current record and mutate it in place; callers that need
//! the untouched record on failure apply them to a copy. Storage, versioning
//! and retries live in [`crate::service`].

use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entities::{Card, GameRecord, GameStatus, Outcome, PlayerId, Prediction, Role},
    errors::{GameError, GameResult},
    functional::{RoundResult, determine_outcome},
};
use crate::commitment::{Commitment, Salt};

/// What a successful transition did to the record
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GameEvent {
    Created(PlayerId),
    Joined(PlayerId),
    Committed(Role),
    Revealed(Role),
    Completed(Outcome),
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Created(player) => format!("{player} created the game"),
            Self::Joined(player) => format!("{player} joined the game"),
            Self::Committed(role) => format!("{role} committed a move"),
            Self::Revealed(role) => format!("{role} revealed a move"),
            Self::Completed(outcome) => format!("game over: {outcome}"),
        };
        write!(f, "{repr}")
    }
}

fn touch(record: &mut GameRecord) {
    record.last_action_at = Utc::now();
}

fn require_in_progress(record: &GameRecord) -> GameResult<()> {
    match record.status {
        GameStatus::InProgress => Ok(()),
        GameStatus::Waiting | GameStatus::Completed => Err(GameError::GameNotInProgress),
    }
}

fn require_role(record: &GameRecord, player: &PlayerId) -> GameResult<Role> {
    record.role_of(player).ok_or(GameError::NotAPlayer)
}

/// Seat `player` as the opponent.
///
/// # Errors
///
/// * `GameError::InvalidInput` - Empty player identifier
/// * `GameError::AlreadyFull` - An opponent is already seated
/// * `GameError::CannotJoinOwnGame` - `player` created this game
pub fn join(record: &mut GameRecord, player: &PlayerId) -> GameResult<GameEvent> {
    if player.is_empty() {
        return Err(GameError::InvalidInput("player id is empty".to_string()));
    }
    if record.opponent.is_some() || record.status != GameStatus::Waiting {
        return Err(GameError::AlreadyFull);
    }
    if &record.creator == player {
        return Err(GameError::CannotJoinOwnGame);
    }

    record.opponent = Some(player.clone());
    record.status = GameStatus::InProgress;
    touch(record);

    debug!("game {}: {player} joined", record.id);
    Ok(GameEvent::Joined(player.clone()))
}

/// Store `commitment` in the caller's slot.
///
/// The slot is picked by identity, so the arrival order of the two
/// commitments does not matter.
///
/// # Errors
///
/// * `GameError::NotAPlayer` - `player` holds no seat
/// * `GameError::GameNotInProgress` - No opponent yet, or game over
/// * `GameError::CommitmentAlreadySubmitted` - This role already committed
pub fn submit_move(
    record: &mut GameRecord,
    player: &PlayerId,
    commitment: Commitment,
) -> GameResult<GameEvent> {
    let role = require_role(record, player)?;
    require_in_progress(record)?;

    let slot = record.player_move_mut(role);
    if slot.is_committed() {
        return Err(GameError::CommitmentAlreadySubmitted);
    }
    slot.commitment = Some(commitment);
    touch(record);

    debug!("game {}: {role} committed", record.id);
    Ok(GameEvent::Committed(role))
}

/// Disclose the caller's move and check it against their commitment.
///
/// The second reveal scores the round and completes the game.
///
/// # Errors
///
/// * `GameError::NotAPlayer` - `player` holds no seat
/// * `GameError::GameNotInProgress` - No opponent yet, or game over
/// * `GameError::NotAllCommitted` - The other side hasn't committed yet
/// * `GameError::AlreadyRevealed` - This role already revealed
/// * `GameError::CommitmentMismatch` - Values don't hash to the commitment
pub fn reveal_move(
    record: &mut GameRecord,
    player: &PlayerId,
    card: Card,
    prediction: Prediction,
    salt: &Salt,
) -> GameResult<GameEvent> {
    let role = require_role(record, player)?;
    require_in_progress(record)?;
    if !record.both_committed() {
        return Err(GameError::NotAllCommitted);
    }

    let slot = record.player_move_mut(role);
    if slot.is_revealed() {
        return Err(GameError::AlreadyRevealed);
    }
    let matches = slot
        .commitment
        .as_ref()
        .is_some_and(|commitment| commitment.verify(card, prediction, salt));
    if !matches {
        return Err(GameError::CommitmentMismatch);
    }

    slot.card = Some(card);
    slot.prediction = Some(prediction);
    touch(record);
    debug!("game {}: {role} revealed", record.id);

    match complete(record) {
        Some(outcome) => Ok(GameEvent::Completed(outcome)),
        None => Ok(GameEvent::Revealed(role)),
    }
}

/// Score the round once both moves are on the table.
fn complete(record: &mut GameRecord) -> Option<Outcome> {
    let (Some(c1), Some(p1), Some(c2), Some(p2)) = (
        record.creator_move.card,
        record.creator_move.prediction,
        record.opponent_move.card,
        record.opponent_move.prediction,
    ) else {
        return None;
    };

    let outcome = match determine_outcome(c1, p1, c2, p2) {
        RoundResult::CreatorWins => Outcome::Winner(record.creator.clone()),
        RoundResult::OpponentWins => match &record.opponent {
            Some(opponent) => Outcome::Winner(opponent.clone()),
            None => Outcome::Draw,
        },
        RoundResult::Draw => Outcome::Draw,
    };

    record.winner = Some(outcome.clone());
    record.status = GameStatus::Completed;
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::commit;
    use crate::game::entities::GamePhase;

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    fn bob() -> PlayerId {
        PlayerId::new("bob")
    }

    fn card(v: u8) -> Card {
        Card::new(v).unwrap()
    }

    fn prediction(v: u8) -> Prediction {
        Prediction::new(v).unwrap()
    }

    fn joined_game() -> GameRecord {
        let mut record = GameRecord::new(alice(), 100);
        join(&mut record, &bob()).unwrap();
        record
    }

    fn committed_game(c1: (u8, u8, &str), c2: (u8, u8, &str)) -> GameRecord {
        let mut record = joined_game();
        submit_move(
            &mut record,
            &alice(),
            commit(card(c1.0), prediction(c1.1), &Salt::new(c1.2)),
        )
        .unwrap();
        submit_move(
            &mut record,
            &bob(),
            commit(card(c2.0), prediction(c2.1), &Salt::new(c2.2)),
        )
        .unwrap();
        record
    }

    #[test]
    fn test_join_sets_opponent_and_status() {
        let record = joined_game();
        assert_eq!(record.opponent, Some(bob()));
        assert_eq!(record.status, GameStatus::InProgress);
        assert_eq!(record.phase(), GamePhase::Committing);
    }

    #[test]
    fn test_join_full_game() {
        let mut record = joined_game();
        let err = join(&mut record, &PlayerId::new("carol")).unwrap_err();
        assert!(matches!(err, GameError::AlreadyFull));
        assert_eq!(record.opponent, Some(bob()));
    }

    #[test]
    fn test_cannot_join_own_game() {
        let mut record = GameRecord::new(alice(), 0);
        assert!(matches!(
            join(&mut record, &alice()),
            Err(GameError::CannotJoinOwnGame)
        ));
        assert!(record.opponent.is_none());
    }

    #[test]
    fn test_join_rejects_empty_player() {
        let mut record = GameRecord::new(alice(), 0);
        assert!(matches!(
            join(&mut record, &PlayerId::new("   ")),
            Err(GameError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_submit_before_join() {
        let mut record = GameRecord::new(alice(), 0);
        let c = commit(card(1), prediction(2), &Salt::new("s"));
        assert!(matches!(
            submit_move(&mut record, &alice(), c),
            Err(GameError::GameNotInProgress)
        ));
    }

    #[test]
    fn test_submit_by_stranger() {
        let mut record = joined_game();
        let c = commit(card(1), prediction(2), &Salt::new("s"));
        assert!(matches!(
            submit_move(&mut record, &PlayerId::new("mallory"), c),
            Err(GameError::NotAPlayer)
        ));
    }

    #[test]
    fn test_opponent_may_commit_first() {
        let mut record = joined_game();
        let c = commit(card(4), prediction(7), &Salt::new("xyz"));
        assert_eq!(
            submit_move(&mut record, &bob(), c.clone()).unwrap(),
            GameEvent::Committed(Role::Opponent)
        );
        assert_eq!(record.opponent_move.commitment, Some(c));
        assert!(record.creator_move.commitment.is_none());
    }

    #[test]
    fn test_second_commitment_rejected() {
        let mut record = joined_game();
        let first = commit(card(3), prediction(7), &Salt::new("abc"));
        let second = commit(card(5), prediction(10), &Salt::new("abc"));
        submit_move(&mut record, &alice(), first.clone()).unwrap();

        assert!(matches!(
            submit_move(&mut record, &alice(), second),
            Err(GameError::CommitmentAlreadySubmitted)
        ));
        assert_eq!(record.creator_move.commitment, Some(first));
        assert!(record.opponent_move.commitment.is_none());
    }

    #[test]
    fn test_reveal_before_both_committed() {
        let mut record = joined_game();
        submit_move(
            &mut record,
            &alice(),
            commit(card(3), prediction(7), &Salt::new("abc")),
        )
        .unwrap();
        assert!(matches!(
            reveal_move(&mut record, &alice(), card(3), prediction(7), &Salt::new("abc")),
            Err(GameError::NotAllCommitted)
        ));
    }

    #[test]
    fn test_reveal_mismatch() {
        let mut record = committed_game((3, 7, "abc"), (4, 7, "xyz"));
        let before = record.clone();

        for (c, p, s) in [(4, 7, "abc"), (3, 8, "abc"), (3, 7, "abd")] {
            let err = reveal_move(&mut record, &alice(), card(c), prediction(p), &Salt::new(s))
                .unwrap_err();
            assert!(matches!(err, GameError::CommitmentMismatch));
        }
        assert_eq!(record, before);
    }

    #[test]
    fn test_reveal_twice() {
        let mut record = committed_game((3, 7, "abc"), (4, 7, "xyz"));
        reveal_move(&mut record, &alice(), card(3), prediction(7), &Salt::new("abc")).unwrap();
        assert!(matches!(
            reveal_move(&mut record, &alice(), card(3), prediction(7), &Salt::new("abc")),
            Err(GameError::AlreadyRevealed)
        ));
    }

    #[test]
    fn test_full_round_draw_both_correct() {
        let mut record = committed_game((3, 7, "abc"), (4, 7, "xyz"));
        assert_eq!(record.phase(), GamePhase::Revealing);

        let event =
            reveal_move(&mut record, &alice(), card(3), prediction(7), &Salt::new("abc")).unwrap();
        assert_eq!(event, GameEvent::Revealed(Role::Creator));
        assert!(record.winner.is_none());
        assert_eq!(record.status, GameStatus::InProgress);

        let event =
            reveal_move(&mut record, &bob(), card(4), prediction(7), &Salt::new("xyz")).unwrap();
        assert_eq!(event, GameEvent::Completed(Outcome::Draw));
        assert_eq!(record.status, GameStatus::Completed);
        assert_eq!(record.winner, Some(Outcome::Draw));
    }

    #[test]
    fn test_creator_revealing_second_is_attributed_to_creator() {
        let mut record = committed_game((2, 4, "a"), (2, 3, "b"));
        reveal_move(&mut record, &bob(), card(2), prediction(3), &Salt::new("b")).unwrap();
        assert_eq!(record.opponent_move.card, Some(card(2)));
        assert!(record.creator_move.card.is_none());

        reveal_move(&mut record, &alice(), card(2), prediction(4), &Salt::new("a")).unwrap();
        assert_eq!(record.creator_move.prediction, Some(prediction(4)));
        assert_eq!(record.winner, Some(Outcome::Winner(alice())));
    }

    #[test]
    fn test_opponent_wins() {
        let mut record = committed_game((1, 2, "a"), (4, 5, "b"));
        reveal_move(&mut record, &alice(), card(1), prediction(2), &Salt::new("a")).unwrap();
        reveal_move(&mut record, &bob(), card(4), prediction(5), &Salt::new("b")).unwrap();
        assert_eq!(record.winner, Some(Outcome::Winner(bob())));
    }

    #[test]
    fn test_completed_game_rejects_moves() {
        let mut record = committed_game((2, 5, "a"), (1, 5, "b"));
        reveal_move(&mut record, &alice(), card(2), prediction(5), &Salt::new("a")).unwrap();
        reveal_move(&mut record, &bob(), card(1), prediction(5), &Salt::new("b")).unwrap();
        assert_eq!(record.winner, Some(Outcome::Draw));

        assert!(matches!(
            reveal_move(&mut record, &bob(), card(1), prediction(5), &Salt::new("b")),
            Err(GameError::GameNotInProgress)
        ));
        assert!(matches!(
            join(&mut record, &PlayerId::new("carol")),
            Err(GameError::AlreadyFull)
        ));
        assert_eq!(record.status, GameStatus::Completed);
    }
}
