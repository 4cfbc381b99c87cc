/// Integration tests for complete Morra rounds
///
/// These tests drive the public `GameService` API through create, join,
/// commit and reveal, checking the recorded outcome and status.
use morra::{
    GameError, GamePhase, GameService, GameStatus, Outcome, PlayerId,
    commitment::{Commitment, Salt, commit},
    game::{Card, Prediction},
};

fn alice() -> PlayerId {
    PlayerId::new("alice")
}

fn bob() -> PlayerId {
    PlayerId::new("bob")
}

fn commitment(card: u8, prediction: u8, salt: &str) -> Commitment {
    commit(
        Card::new(card).unwrap(),
        Prediction::new(prediction).unwrap(),
        &Salt::new(salt),
    )
}

/// Play a whole round; returns the final record.
async fn play_round(
    service: &GameService,
    creator: (u8, u8, &str),
    opponent: (u8, u8, &str),
) -> morra::GameRecord {
    let id = service.create_game(&alice(), 0).await.unwrap();
    service.join_game(id, &bob()).await.unwrap();

    service
        .submit_move(id, &alice(), commitment(creator.0, creator.1, creator.2))
        .await
        .unwrap();
    service
        .submit_move(id, &bob(), commitment(opponent.0, opponent.1, opponent.2))
        .await
        .unwrap();

    service
        .reveal_move(id, &alice(), creator.0, creator.1, &Salt::new(creator.2))
        .await
        .unwrap();
    service
        .reveal_move(id, &bob(), opponent.0, opponent.1, &Salt::new(opponent.2))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_both_predict_seven_is_draw() {
    let service = GameService::in_memory();
    let game = play_round(&service, (3, 7, "abc"), (4, 7, "xyz")).await;

    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner, Some(Outcome::Draw));
}

#[tokio::test]
async fn test_nobody_predicts_total_is_draw() {
    let service = GameService::in_memory();
    let game = play_round(&service, (2, 5, "s1"), (1, 5, "s2")).await;

    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner, Some(Outcome::Draw));
}

#[tokio::test]
async fn test_creator_wins_with_only_correct_prediction() {
    let service = GameService::in_memory();
    let game = play_round(&service, (2, 4, "s1"), (2, 3, "s2")).await;

    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner, Some(Outcome::Winner(alice())));
}

#[tokio::test]
async fn test_status_progression() {
    let service = GameService::in_memory();
    let id = service.create_game(&alice(), 250).await.unwrap();

    let game = service.get_game_state(id).await.unwrap();
    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.bet_amount, 250);

    let game = service.join_game(id, &bob()).await.unwrap();
    assert_eq!(game.phase(), GamePhase::Committing);

    service
        .submit_move(id, &alice(), commitment(1, 6, "a"))
        .await
        .unwrap();
    let game = service
        .submit_move(id, &bob(), commitment(5, 6, "b"))
        .await
        .unwrap();
    assert_eq!(game.phase(), GamePhase::Revealing);
    assert_eq!(game.status, GameStatus::InProgress);

    let game = service
        .reveal_move(id, &alice(), 1, 6, &Salt::new("a"))
        .await
        .unwrap();
    assert_eq!(game.status, GameStatus::InProgress);
    assert!(game.winner.is_none());

    let game = service
        .reveal_move(id, &bob(), 5, 6, &Salt::new("b"))
        .await
        .unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner, Some(Outcome::Draw));
}

#[tokio::test]
async fn test_join_errors() {
    let service = GameService::in_memory();
    let missing = morra::GameId::new();
    assert!(matches!(
        service.join_game(missing, &bob()).await,
        Err(GameError::NotFound(_))
    ));

    let id = service.create_game(&alice(), 0).await.unwrap();
    service.join_game(id, &bob()).await.unwrap();
    assert!(matches!(
        service.join_game(id, &PlayerId::new("carol")).await,
        Err(GameError::AlreadyFull)
    ));
}

#[tokio::test]
async fn test_reveal_with_wrong_salt_rejected() {
    let service = GameService::in_memory();
    let id = service.create_game(&alice(), 0).await.unwrap();
    service.join_game(id, &bob()).await.unwrap();
    service
        .submit_move(id, &alice(), commitment(3, 7, "abc"))
        .await
        .unwrap();
    service
        .submit_move(id, &bob(), commitment(4, 7, "xyz"))
        .await
        .unwrap();

    assert!(matches!(
        service.reveal_move(id, &alice(), 3, 7, &Salt::new("abd")).await,
        Err(GameError::CommitmentMismatch)
    ));
    // A different move under the right salt is also caught
    assert!(matches!(
        service.reveal_move(id, &alice(), 3, 8, &Salt::new("abc")).await,
        Err(GameError::CommitmentMismatch)
    ));

    let game = service.get_game_state(id).await.unwrap();
    assert!(game.creator_move.card.is_none());
    assert!(game.creator_move.prediction.is_none());
}

#[tokio::test]
async fn test_commitment_cannot_be_replaced() {
    let service = GameService::in_memory();
    let id = service.create_game(&alice(), 0).await.unwrap();
    service.join_game(id, &bob()).await.unwrap();

    let original = commitment(3, 7, "abc");
    service.submit_move(id, &alice(), original.clone()).await.unwrap();
    assert!(matches!(
        service.submit_move(id, &alice(), commitment(5, 10, "abc")).await,
        Err(GameError::CommitmentAlreadySubmitted)
    ));

    let game = service.get_game_state(id).await.unwrap();
    assert_eq!(game.creator_move.commitment, Some(original));
    assert!(game.opponent_move.commitment.is_none());
}

#[tokio::test]
async fn test_outsider_cannot_move() {
    let service = GameService::in_memory();
    let id = service.create_game(&alice(), 0).await.unwrap();
    service.join_game(id, &bob()).await.unwrap();

    assert!(matches!(
        service
            .submit_move(id, &PlayerId::new("mallory"), commitment(1, 2, "m"))
            .await,
        Err(GameError::NotAPlayer)
    ));
}

#[tokio::test]
async fn test_games_are_independent() {
    let service = GameService::in_memory();
    let first = service.create_game(&alice(), 0).await.unwrap();
    let second = service.create_game(&alice(), 0).await.unwrap();
    assert_ne!(first, second);

    service.join_game(first, &bob()).await.unwrap();
    assert_eq!(
        service.get_game_state(second).await.unwrap().status,
        GameStatus::Waiting
    );
}
