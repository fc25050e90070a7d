//! Game logic for Peril.
//!
//! Owns the per-process view of one player's game: the world map rules
//! table, the state machine that classifies inbound messages and
//! validates operator commands, and the actor task that serializes all
//! mutation.
//!
//! # Key types
//!
//! - [`WorldMap`] — static territory adjacency, loaded once
//! - [`GameState`] — the state machine itself (synchronous, fully
//!   unit-testable)
//! - [`GameHandle`] / [`spawn_game`] — the owning task and its handle;
//!   everything concurrent goes through this
//! - [`MoveOutcome`] / [`WarOutcome`] — classifications the dispatch
//!   layer maps to acknowledgement decisions

mod actor;
mod error;
mod map;
mod state;

pub use actor::{GameHandle, spawn_game};
pub use error::GameError;
pub use map::WorldMap;
pub use state::{
    GameState, Incursion, MoveOutcome, StatusReport, TerritoryState,
    WarOutcome, spam_line, spam_line_with,
};
