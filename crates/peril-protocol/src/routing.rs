//! Broker topology names shared by every Peril process.
//!
//! These are fixed by the external contract: a client and a server that
//! disagree on an exchange name or a binding pattern simply never see
//! each other's messages. All routing-key construction goes through the
//! helpers here so the `<prefix>.<username>` convention lives in one
//! place.

use crate::Username;

// ---------------------------------------------------------------------------
// Exchanges
// ---------------------------------------------------------------------------

/// Direct exchange for broadcast control signals (pause/resume).
pub const EXCHANGE_PERIL_DIRECT: &str = "peril_direct";

/// Topic exchange carrying moves, war recognitions, and game logs.
pub const EXCHANGE_PERIL_TOPIC: &str = "peril_topic";

/// Fanout dead-letter exchange. Every consumer queue dead-letters here,
/// so a permanently rejected message lands in an inspectable sink
/// instead of vanishing.
pub const EXCHANGE_PERIL_DLX: &str = "peril_dlx";

// ---------------------------------------------------------------------------
// Routing keys and queue names
// ---------------------------------------------------------------------------

/// Routing key for pause/resume broadcasts on the direct exchange.
pub const PAUSE_KEY: &str = "pause";

/// Routing-key prefix for army moves: `army_moves.<username>`.
pub const ARMY_MOVES_PREFIX: &str = "army_moves";

/// Routing-key prefix for war recognitions: `war.<username>`.
pub const WAR_RECOGNITIONS_PREFIX: &str = "war";

/// Routing-key prefix for game logs: `game_logs.<username>`.
pub const GAME_LOGS_PREFIX: &str = "game_logs";

/// Name of the shared durable queue all clients consume wars from.
pub const WAR_QUEUE: &str = "war";

/// Name of the durable queue the server aggregates game logs on.
pub const GAME_LOGS_QUEUE: &str = "game_logs";

/// Name of the durable sink queue bound to the dead-letter exchange.
pub const DEAD_LETTER_QUEUE: &str = "peril_dlq";

/// Builds a player-scoped key or queue name: `army_moves.alice`.
pub fn scoped(prefix: &str, username: &Username) -> String {
    format!("{prefix}.{username}")
}

/// Builds the one-level wildcard binding pattern: `army_moves.*`.
pub fn wildcard(prefix: &str) -> String {
    format!("{prefix}.*")
}
