//! Pure scoring functions.

use super::entities::{Card, Prediction};

/// Which side of the table guessed the total.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundResult {
    CreatorWins,
    OpponentWins,
    Draw,
}

/// Sum of both thrown cards.
pub fn total(creator_card: Card, opponent_card: Card) -> u8 {
    creator_card.value() + opponent_card.value()
}

/// Score a fully revealed round.
///
/// A player wins only if they alone predicted the total. Both right or both
/// wrong is a draw.
pub fn determine_outcome(
    creator_card: Card,
    creator_prediction: Prediction,
    opponent_card: Card,
    opponent_prediction: Prediction,
) -> RoundResult {
    let total = total(creator_card, opponent_card);
    let creator_hit = creator_prediction.value() == total;
    let opponent_hit = opponent_prediction.value() == total;

    match (creator_hit, opponent_hit) {
        (true, false) => RoundResult::CreatorWins,
        (false, true) => RoundResult::OpponentWins,
        _ => RoundResult::Draw,
    }
}
