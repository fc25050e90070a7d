//! Game state actor: one Tokio task owns the mutable [`GameState`].
//!
//! Delivery loops for the pause, move, and war queues all run
//! concurrently, and every one of them wants to mutate the same state.
//! Instead of sharing the state behind a lock, mutation is routed
//! through a single owning task — callers hold a [`GameHandle`] and
//! talk to the owner over a channel, so two queues can never touch the
//! state at the same time.

use peril_protocol::{ArmyMove, PlayingState, Username, WarRecognition};
use tokio::sync::{mpsc, oneshot};

use crate::{
    GameError, GameState, MoveOutcome, StatusReport, WarOutcome, WorldMap,
};

/// Commands sent to the state-owner task.
///
/// Each variant carries a `oneshot::Sender` reply channel — the caller
/// sends a command and awaits the answer, so handler decisions are
/// made on the post-mutation state.
enum GameCommand {
    HandleMove {
        mv: ArmyMove,
        reply: oneshot::Sender<Result<MoveOutcome, GameError>>,
    },
    HandleWar {
        rw: WarRecognition,
        reply: oneshot::Sender<Result<WarOutcome, GameError>>,
    },
    HandlePause {
        state: PlayingState,
        reply: oneshot::Sender<()>,
    },
    Spawn {
        territory: String,
        units: u32,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    CommandMove {
        from: String,
        to: String,
        units: u32,
        reply: oneshot::Sender<Result<ArmyMove, GameError>>,
    },
    Status {
        reply: oneshot::Sender<StatusReport>,
    },
    IsPaused {
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to the running state owner. Cheap to clone — every handler
/// and the command loop hold one.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    async fn request<R>(
        &self,
        command: GameCommand,
        reply_rx: oneshot::Receiver<R>,
    ) -> Result<R, GameError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| GameError::StateUnavailable)?;
        reply_rx.await.map_err(|_| GameError::StateUnavailable)
    }

    /// Classifies and applies an inbound army move.
    pub async fn handle_move(
        &self,
        mv: ArmyMove,
    ) -> Result<MoveOutcome, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::HandleMove { mv, reply }, rx)
            .await?
    }

    /// Resolves an inbound war recognition.
    pub async fn handle_war(
        &self,
        rw: WarRecognition,
    ) -> Result<WarOutcome, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::HandleWar { rw, reply }, rx)
            .await?
    }

    /// Applies a pause/resume broadcast.
    pub async fn handle_pause(
        &self,
        state: PlayingState,
    ) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::HandlePause { state, reply }, rx)
            .await
    }

    /// Stations fresh units on a territory.
    pub async fn spawn(
        &self,
        territory: impl Into<String>,
        units: u32,
    ) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            GameCommand::Spawn {
                territory: territory.into(),
                units,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Validates and locally applies an operator move; returns the
    /// [`ArmyMove`] to broadcast.
    pub async fn command_move(
        &self,
        from: impl Into<String>,
        to: impl Into<String>,
        units: u32,
    ) -> Result<ArmyMove, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            GameCommand::CommandMove {
                from: from.into(),
                to: to.into(),
                units,
                reply,
            },
            rx,
        )
        .await?
    }

    /// The local player's current standing.
    pub async fn status(&self) -> Result<StatusReport, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::Status { reply }, rx).await
    }

    /// Whether the server has paused the game.
    pub async fn is_paused(&self) -> Result<bool, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::IsPaused { reply }, rx).await
    }
}

/// Spawns the state-owner task for one player and returns its handle.
///
/// The task runs until every handle is dropped.
pub fn spawn_game(username: Username, map: WorldMap) -> GameHandle {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(run(GameState::new(username, map), rx));
    GameHandle { sender: tx }
}

async fn run(mut state: GameState, mut receiver: mpsc::Receiver<GameCommand>) {
    tracing::info!(player = %state.player().username, "game state task started");

    while let Some(command) = receiver.recv().await {
        match command {
            GameCommand::HandleMove { mv, reply } => {
                let _ = reply.send(state.handle_move(&mv));
            }
            GameCommand::HandleWar { rw, reply } => {
                let _ = reply.send(state.handle_war(&rw));
            }
            GameCommand::HandlePause { state: playing, reply } => {
                state.handle_pause(&playing);
                let _ = reply.send(());
            }
            GameCommand::Spawn {
                territory,
                units,
                reply,
            } => {
                let _ = reply.send(state.spawn(&territory, units));
            }
            GameCommand::CommandMove {
                from,
                to,
                units,
                reply,
            } => {
                let _ = reply.send(state.command_move(&from, &to, units));
            }
            GameCommand::Status { reply } => {
                let _ = reply.send(state.status());
            }
            GameCommand::IsPaused { reply } => {
                let _ = reply.send(state.is_paused());
            }
        }
    }

    tracing::info!(player = %state.player().username, "game state task stopped");
}
