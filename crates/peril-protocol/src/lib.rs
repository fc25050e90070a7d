//! Wire protocol for Peril.
//!
//! This crate defines the language every Peril process speaks:
//!
//! - **Types** ([`ArmyMove`], [`WarRecognition`], [`GameLog`],
//!   [`PlayingState`], …) — the message structures that travel over
//!   the broker.
//! - **Routing** ([`routing`]) — the fixed exchange, queue, and
//!   routing-key names all processes must agree on.
//! - **Codecs** ([`Codec`], [`JsonCodec`], [`BincodeCodec`]) — how
//!   messages are converted to/from payload bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (opaque bytes tagged
//! with a routing key and content type) and the game state machine
//! (typed messages). It knows nothing about queues, deliveries, or
//! acknowledgements.
//!
//! ```text
//! Transport (bytes) → Protocol (typed message) → Game (state change)
//! ```

mod codec;
mod error;
pub mod routing;
mod types;

pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{ArmyMove, GameLog, Player, PlayingState, Username, WarId, WarRecognition};
