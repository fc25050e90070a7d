//! Dispatch wiring: the static table binding exchanges, queues, and
//! routing-key patterns to handlers, and the functions that bring a
//! process's subscriptions up.
//!
//! The table is configuration, not logic — but it is load-bearing
//! configuration: a pattern that matches the wrong subset of routing
//! keys silently detaches a process from the game.

use lapin::Connection;
use peril_game::GameHandle;
use peril_protocol::{
    ArmyMove, BincodeCodec, GameLog, JsonCodec, PlayingState, Username,
    WarRecognition, routing,
};
use peril_transport::{
    AmqpPublisher, Durability, ExchangeKind, QueueBinding, TransportError,
    subscribe, topology,
};
use tokio::task::JoinHandle;

use crate::handlers::{
    GameLogHandler, MoveHandler, PauseHandler, WarHandler,
};

// ---------------------------------------------------------------------------
// The dispatch table
// ---------------------------------------------------------------------------

/// The client's subscription rows: pause broadcasts and move broadcasts
/// on per-client transient queues, war recognitions on the shared
/// durable queue.
pub fn client_bindings(username: &Username) -> [QueueBinding; 3] {
    [
        QueueBinding::new(
            routing::EXCHANGE_PERIL_DIRECT,
            routing::scoped(routing::PAUSE_KEY, username),
            routing::PAUSE_KEY,
            Durability::Transient,
        ),
        QueueBinding::new(
            routing::EXCHANGE_PERIL_TOPIC,
            routing::scoped(routing::ARMY_MOVES_PREFIX, username),
            routing::wildcard(routing::ARMY_MOVES_PREFIX),
            Durability::Transient,
        ),
        QueueBinding::new(
            routing::EXCHANGE_PERIL_TOPIC,
            routing::WAR_QUEUE,
            routing::wildcard(routing::WAR_RECOGNITIONS_PREFIX),
            Durability::Durable,
        ),
    ]
}

/// The server's subscription row: aggregated game logs on a durable
/// queue.
pub fn server_bindings() -> [QueueBinding; 1] {
    [QueueBinding::new(
        routing::EXCHANGE_PERIL_TOPIC,
        routing::GAME_LOGS_QUEUE,
        routing::wildcard(routing::GAME_LOGS_PREFIX),
        Durability::Durable,
    )]
}

/// Declares every exchange the game uses, dead-letter sink included.
/// Idempotent; both processes call it so start order doesn't matter.
async fn declare_exchanges(conn: &Connection) -> Result<(), TransportError> {
    let channel = conn
        .create_channel()
        .await
        .map_err(TransportError::Channel)?;
    topology::declare_exchange(
        &channel,
        routing::EXCHANGE_PERIL_DIRECT,
        ExchangeKind::Direct,
    )
    .await?;
    topology::declare_exchange(
        &channel,
        routing::EXCHANGE_PERIL_TOPIC,
        ExchangeKind::Topic,
    )
    .await?;
    topology::declare_dead_letter_sink(&channel).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Client wiring
// ---------------------------------------------------------------------------

/// A wired client: the publishers its command loop needs, plus the
/// join handles of its delivery loops.
pub struct ClientWiring {
    /// JSON publisher for moves (and anything else human-inspectable).
    pub moves: AmqpPublisher<JsonCodec>,
    /// Binary publisher for game-log entries.
    pub logs: AmqpPublisher<BincodeCodec>,
    /// One task per subscription; they end when the connection closes.
    pub loops: Vec<JoinHandle<()>>,
}

/// Declares topology and starts every client subscription.
///
/// Fatal on any declaration error — a client without its queues is not
/// in the game.
pub async fn wire_client(
    conn: &Connection,
    username: &Username,
    game: GameHandle,
) -> Result<ClientWiring, TransportError> {
    declare_exchanges(conn).await?;

    let moves = AmqpPublisher::new(
        conn.create_channel()
            .await
            .map_err(TransportError::Channel)?,
        JsonCodec,
    );
    let logs = AmqpPublisher::new(
        conn.create_channel()
            .await
            .map_err(TransportError::Channel)?,
        BincodeCodec,
    );

    let [pause, army_moves, war] = client_bindings(username);

    let loops = vec![
        subscribe::<PlayingState, _, _>(
            conn,
            pause,
            JsonCodec,
            PauseHandler::new(game.clone()),
        )
        .await?,
        subscribe::<ArmyMove, _, _>(
            conn,
            army_moves,
            JsonCodec,
            MoveHandler::new(game.clone(), moves.clone()),
        )
        .await?,
        subscribe::<WarRecognition, _, _>(
            conn,
            war,
            JsonCodec,
            WarHandler::new(game, logs.clone()),
        )
        .await?,
    ];

    Ok(ClientWiring { moves, logs, loops })
}

// ---------------------------------------------------------------------------
// Server wiring
// ---------------------------------------------------------------------------

/// A wired server: the pause publisher and the log loop handle.
pub struct ServerWiring {
    /// JSON publisher for pause/resume broadcasts.
    pub control: AmqpPublisher<JsonCodec>,
    /// The game-log delivery loop.
    pub loops: Vec<JoinHandle<()>>,
}

/// Declares topology and starts the server's subscriptions.
pub async fn wire_server(
    conn: &Connection,
) -> Result<ServerWiring, TransportError> {
    declare_exchanges(conn).await?;

    let control = AmqpPublisher::new(
        conn.create_channel()
            .await
            .map_err(TransportError::Channel)?,
        JsonCodec,
    );

    let [game_logs] = server_bindings();
    let loops = vec![
        subscribe::<GameLog, _, _>(conn, game_logs, BincodeCodec, GameLogHandler)
            .await?,
    ];

    Ok(ServerWiring { control, loops })
}
