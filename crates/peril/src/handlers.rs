//! Message handlers: the glue between the transport's delivery loops
//! and the game state machine.
//!
//! Each handler is a struct holding exactly the dependencies it uses —
//! the game handle, and a publisher where a state transition triggers
//! an outbound message. The mapping from state-machine outcome to
//! [`AckDecision`] lives here and nowhere else.

use chrono::Utc;
use peril_game::{GameError, GameHandle, MoveOutcome, WarOutcome};
use peril_protocol::{
    ArmyMove, GameLog, PlayingState, WarRecognition, routing,
};
use peril_transport::{AckDecision, Handler, Publish};

/// Maps a game-level failure to a decision: a gone state task is
/// transient, everything else marks the message permanently invalid.
fn decision_for_error(error: &GameError) -> AckDecision {
    match error {
        GameError::StateUnavailable => {
            AckDecision::requeue("game state task unavailable")
        }
        other => AckDecision::discard(format!("invalid message: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// Applies pause/resume broadcasts from the server.
pub struct PauseHandler {
    game: GameHandle,
}

impl PauseHandler {
    pub fn new(game: GameHandle) -> Self {
        Self { game }
    }
}

impl Handler<PlayingState> for PauseHandler {
    async fn handle(&self, msg: PlayingState) -> AckDecision {
        match self.game.handle_pause(msg).await {
            Ok(()) => AckDecision::Ack,
            Err(error) => decision_for_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Applies broadcast army moves; a move into our territory publishes a
/// war recognition to the defender-scoped key.
pub struct MoveHandler<P> {
    game: GameHandle,
    publisher: P,
}

impl<P> MoveHandler<P> {
    pub fn new(game: GameHandle, publisher: P) -> Self {
        Self { game, publisher }
    }
}

impl<P: Publish> Handler<ArmyMove> for MoveHandler<P> {
    async fn handle(&self, msg: ArmyMove) -> AckDecision {
        match self.game.handle_move(msg).await {
            Ok(MoveOutcome::Safe) => AckDecision::Ack,
            Ok(MoveOutcome::SamePlayerViolation) => {
                AckDecision::discard("own move echoed back")
            }
            Ok(MoveOutcome::MakesWar(rw)) => {
                let key = routing::scoped(
                    routing::WAR_RECOGNITIONS_PREFIX,
                    &rw.defender.username,
                );
                match self
                    .publisher
                    .publish(routing::EXCHANGE_PERIL_TOPIC, &key, &rw)
                    .await
                {
                    Ok(()) => AckDecision::Ack,
                    // The war must not be lost: retry the whole move.
                    Err(error) => AckDecision::requeue(format!(
                        "war recognition publish failed: {error}"
                    )),
                }
            }
            Err(error) => decision_for_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// Wars
// ---------------------------------------------------------------------------

/// Resolves war recognitions from the shared durable queue and emits
/// the narrative game log.
pub struct WarHandler<P> {
    game: GameHandle,
    publisher: P,
}

impl<P> WarHandler<P> {
    pub fn new(game: GameHandle, publisher: P) -> Self {
        Self { game, publisher }
    }
}

impl<P: Publish> Handler<WarRecognition> for WarHandler<P> {
    async fn handle(&self, msg: WarRecognition) -> AckDecision {
        let attacker = msg.attacker.username.clone();
        match self.game.handle_war(msg).await {
            Ok(WarOutcome::NotInvolved) => {
                AckDecision::requeue("recognition addressed to another player")
            }
            Ok(WarOutcome::NoUnits) => {
                AckDecision::discard("defender has no units")
            }
            Ok(
                WarOutcome::YouWon { log }
                | WarOutcome::OpponentWon { log }
                | WarOutcome::Draw { log }
                | WarOutcome::AlreadyResolved { log },
            ) => {
                let entry = GameLog {
                    username: attacker.clone(),
                    message: log,
                    current_time: Utc::now(),
                };
                let key =
                    routing::scoped(routing::GAME_LOGS_PREFIX, &attacker);
                match self
                    .publisher
                    .publish(routing::EXCHANGE_PERIL_TOPIC, &key, &entry)
                    .await
                {
                    Ok(()) => AckDecision::Ack,
                    // Combat is recorded in the ledger; the redelivery
                    // will skip it and only retry this log.
                    Err(error) => AckDecision::requeue(format!(
                        "game log publish failed: {error}"
                    )),
                }
            }
            Err(error) => decision_for_error(&error),
        }
    }
}

// ---------------------------------------------------------------------------
// Game logs (server side)
// ---------------------------------------------------------------------------

/// Reports aggregated game-log entries on the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameLogHandler;

impl Handler<GameLog> for GameLogHandler {
    async fn handle(&self, msg: GameLog) -> AckDecision {
        tracing::info!(
            player = %msg.username,
            time = %msg.current_time,
            "{}",
            msg.message
        );
        AckDecision::Ack
    }
}
