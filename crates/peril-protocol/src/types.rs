//! Core wire types for Peril.
//!
//! This module defines every type that travels over the broker — the
//! structures that get serialized to bytes, published to an exchange,
//! and deserialized by whichever process consumes them.
//!
//! Every process derives its view of the game from these messages alone:
//! there is no shared storage and no central coordinator, so the wire
//! shapes below ARE the protocol.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's unique name.
///
/// Newtype over `String` so a username can't be confused with a territory
/// name or a log message in a signature.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `Username("alice")` is just `"alice"` on the wire — the same string
/// the routing keys are built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    /// Returns the name as a `&str` (for routing-key construction).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A player's identity as it travels inside moves and war recognitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// The unique username chosen at process start.
    pub username: Username,
}

impl Player {
    /// Creates a player from anything username-like.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Username(username.into()),
        }
    }
}

/// Identifier of a single war recognition.
///
/// Stamped (v4) by the process that declares the war. Consumers keep a
/// ledger of resolved ids so a redelivered recognition never resolves
/// combat twice — this id is the idempotence key under at-least-once
/// delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarId(pub Uuid);

impl WarId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WarId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "war-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game messages
// ---------------------------------------------------------------------------

/// An army movement, broadcast to every client on the moves topic.
///
/// The mover publishes this after validating the move locally; every
/// other process applies it to its own world view. A move into territory
/// owned by the receiving process's player is what starts a war.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmyMove {
    /// Who is moving.
    pub player: Player,
    /// Source territory. Must be owned by the mover.
    pub from: String,
    /// Destination territory. Must be adjacent to `from`.
    pub to: String,
    /// How many units move. At most the units stationed at `from`.
    pub units: u32,
}

/// A declaration that combat must be resolved between two players.
///
/// Published by the defender's process when an enemy move enters its
/// territory, consumed from the shared durable war queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarRecognition {
    /// Idempotence key — see [`WarId`].
    pub id: WarId,
    /// The player whose move started the war.
    pub attacker: Player,
    /// The player whose territory was entered.
    pub defender: Player,
    /// The contested territory.
    pub territory: String,
}

/// One line of game narrative, replicated to every log subscriber.
///
/// Game logs travel in the compact binary encoding; everything else is
/// human-inspectable JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLog {
    /// The player the entry is about.
    pub username: Username,
    /// Free-text narrative ("alice won a war against bob.").
    pub message: String,
    /// When the entry was created.
    pub current_time: DateTime<Utc>,
}

/// Pause/resume control signal, broadcast from the server to all clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingState {
    /// `true` while the game is paused. Clients gate move/spam commands
    /// on this flag.
    pub is_paused: bool,
}

// =========================================================================
// Tests
// =========================================================================
