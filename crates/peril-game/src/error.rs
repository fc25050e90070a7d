//! Error types for the game layer.

use peril_protocol::Username;

/// Errors that can occur validating or applying game operations.
///
/// Errors surfaced while handling an inbound delivery mean the message
/// is permanently invalid (discard, never retry); errors surfaced from
/// a local command are reported to the operator and the command loop
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The named territory does not exist on the world map.
    #[error("unknown territory: {0}")]
    UnknownTerritory(String),

    /// The territory is already held by another player.
    #[error("territory {territory} is held by {owner}")]
    TerritoryHeld {
        territory: String,
        owner: Username,
    },

    /// The local player does not hold the source territory.
    #[error("you do not hold {0}")]
    NotYourTerritory(String),

    /// The two territories are not adjacent on the world map.
    #[error("{from} and {to} are not adjacent")]
    NotAdjacent { from: String, to: String },

    /// More units requested than are stationed at the source.
    #[error("only {available} units stationed at {territory}, cannot move {requested}")]
    NotEnoughUnits {
        territory: String,
        available: u32,
        requested: u32,
    },

    /// Unit counts must be positive.
    #[error("unit count must be at least 1")]
    ZeroUnits,

    /// The server has paused the game; moves are gated on resume.
    #[error("the game is paused")]
    GamePaused,

    /// The state-owner task is gone (its channel closed).
    #[error("game state task is unavailable")]
    StateUnavailable,
}
