//! Integration tests for the state-owner actor.
//!
//! Everything here goes through [`GameHandle`] — the same surface the
//! delivery loops use — so these tests cover the command channel and
//! reply plumbing, not just the state machine.

use peril_game::{GameError, MoveOutcome, WarOutcome, WorldMap, spawn_game};
use peril_protocol::{
    ArmyMove, Player, PlayingState, Username, WarId, WarRecognition,
};

fn mv(player: &str, from: &str, to: &str, units: u32) -> ArmyMove {
    ArmyMove {
        player: Player::new(player),
        from: from.into(),
        to: to.into(),
        units,
    }
}

fn war(attacker: &str, defender: &str, territory: &str) -> WarRecognition {
    WarRecognition {
        id: WarId::new(),
        attacker: Player::new(attacker),
        defender: Player::new(defender),
        territory: territory.into(),
    }
}

#[tokio::test]
async fn test_spawn_and_status_through_handle() {
    let game = spawn_game(Username::from("alice"), WorldMap::standard());

    game.spawn("europe", 3).await.unwrap();
    game.spawn("asia", 2).await.unwrap();

    let report = game.status().await.unwrap();
    assert_eq!(report.username, Username::from("alice"));
    assert_eq!(report.total_units, 5);
    assert_eq!(
        report.territories,
        vec![("asia".to_string(), 2), ("europe".to_string(), 3)]
    );
}

#[tokio::test]
async fn test_pause_gates_moves_through_handle() {
    let game = spawn_game(Username::from("alice"), WorldMap::standard());
    game.spawn("europe", 3).await.unwrap();

    game.handle_pause(PlayingState { is_paused: true })
        .await
        .unwrap();
    assert!(game.is_paused().await.unwrap());
    assert!(matches!(
        game.command_move("europe", "asia", 1).await,
        Err(GameError::GamePaused)
    ));

    game.handle_pause(PlayingState { is_paused: false })
        .await
        .unwrap();
    assert!(game.command_move("europe", "asia", 1).await.is_ok());
}

#[tokio::test]
async fn test_inbound_move_classification_through_handle() {
    let game = spawn_game(Username::from("bob"), WorldMap::standard());
    game.spawn("asia", 1).await.unwrap();

    // Own move echoed back from the topic.
    let own = game.handle_move(mv("bob", "asia", "europe", 1)).await.unwrap();
    assert_eq!(own, MoveOutcome::SamePlayerViolation);

    // Enemy move into our territory.
    let outcome = game
        .handle_move(mv("alice", "europe", "asia", 2))
        .await
        .unwrap();
    match outcome {
        MoveOutcome::MakesWar(rw) => {
            assert_eq!(rw.defender, Player::new("bob"));
            assert_eq!(rw.territory, "asia");
        }
        other => panic!("expected MakesWar, got {other:?}"),
    }
}

#[tokio::test]
async fn test_full_war_flow_through_handle() {
    let game = spawn_game(Username::from("bob"), WorldMap::standard());
    game.spawn("asia", 1).await.unwrap();

    let outcome = game
        .handle_move(mv("alice", "europe", "asia", 2))
        .await
        .unwrap();
    let MoveOutcome::MakesWar(rw) = outcome else {
        panic!("expected MakesWar");
    };

    // Resolve: alice committed 2 against bob's 1.
    let result = game.handle_war(rw.clone()).await.unwrap();
    match result {
        WarOutcome::OpponentWon { log } => {
            assert_eq!(log, "alice won a war against bob.");
        }
        other => panic!("expected OpponentWon, got {other:?}"),
    }

    // Redelivery hits the ledger, not combat.
    let again = game.handle_war(rw).await.unwrap();
    assert!(matches!(again, WarOutcome::AlreadyResolved { .. }));
}

#[tokio::test]
async fn test_war_for_other_players_is_not_involved() {
    let game = spawn_game(Username::from("carol"), WorldMap::standard());
    let outcome = game.handle_war(war("alice", "bob", "asia")).await.unwrap();
    assert_eq!(outcome, WarOutcome::NotInvolved);
}

#[tokio::test]
async fn test_concurrent_commands_are_serialized() {
    // Hammer the actor from many tasks at once; the final unit count
    // must account for every spawn exactly once.
    let game = spawn_game(Username::from("alice"), WorldMap::standard());

    let mut joins = Vec::new();
    for _ in 0..50 {
        let game = game.clone();
        joins.push(tokio::spawn(async move {
            game.spawn("europe", 1).await.unwrap();
        }));
    }
    for join in joins {
        join.await.unwrap();
    }

    assert_eq!(game.status().await.unwrap().total_units, 50);
}
