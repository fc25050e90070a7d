//! AMQP transport layer for Peril.
//!
//! Provides the generic publish/subscribe primitives every Peril process
//! is built on:
//!
//! - [`topology`] — exchange and queue declaration, durable/transient
//!   policy, dead-letter routing.
//! - [`Publish`] / [`AmqpPublisher`] — typed publication with a codec
//!   and a content-type tag.
//! - [`subscribe`] — one independent, prefetch-1 delivery loop per
//!   queue, decoding payloads and applying a handler's
//!   [`AckDecision`].
//!
//! The transport knows nothing about the game: payloads are typed only
//! through the caller's choice of `T` and codec, and the only verdict a
//! handler can hand back is the three-way acknowledgement decision.

use std::fmt;

mod error;
mod publisher;
mod subscriber;
pub mod topology;

pub use error::TransportError;
pub use lapin::ExchangeKind;
pub use publisher::{AmqpPublisher, Publish};
pub use subscriber::{Handler, QueueBinding, subscribe};
pub use topology::Durability;

use lapin::{Connection, ConnectionProperties};

/// What to do with a delivery after its handler ran.
///
/// This is the entire contract between game logic and the broker: the
/// handler classifies the message, the delivery loop translates the
/// classification into a broker acknowledgement. The `reason` on the
/// negative variants is logged when the decision is applied, so a
/// requeue storm or a dead-letter burst can be traced to a cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckDecision {
    /// Processing succeeded — acknowledge and remove from the queue.
    Ack,
    /// Transient condition — redeliver, possibly to another consumer.
    /// Subject to the retry ceiling; see [`subscribe`].
    Requeue { reason: String },
    /// Permanently invalid — reject without requeue, routing the
    /// message to the dead-letter sink.
    Discard { reason: String },
}

impl AckDecision {
    /// Shorthand for a requeue with a cause.
    pub fn requeue(reason: impl Into<String>) -> Self {
        Self::Requeue {
            reason: reason.into(),
        }
    }

    /// Shorthand for a discard with a cause.
    pub fn discard(reason: impl Into<String>) -> Self {
        Self::Discard {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AckDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ack"),
            Self::Requeue { reason } => write!(f, "requeue ({reason})"),
            Self::Discard { reason } => write!(f, "discard ({reason})"),
        }
    }
}

/// Connects to the broker at the given AMQP URL.
///
/// A failure here is fatal to the process — there is nothing useful a
/// Peril process can do without its broker.
pub async fn connect(url: &str) -> Result<Connection, TransportError> {
    let conn = Connection::connect(url, ConnectionProperties::default())
        .await
        .map_err(TransportError::Connect)?;
    tracing::info!(url, "connected to broker");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_decision_display_carries_reason() {
        assert_eq!(AckDecision::Ack.to_string(), "ack");
        assert_eq!(
            AckDecision::requeue("not addressed to us").to_string(),
            "requeue (not addressed to us)"
        );
        assert_eq!(
            AckDecision::discard("defender has no units").to_string(),
            "discard (defender has no units)"
        );
    }

    #[test]
    fn test_ack_decision_shorthands() {
        assert_eq!(
            AckDecision::requeue("x"),
            AckDecision::Requeue { reason: "x".into() }
        );
        assert_eq!(
            AckDecision::discard("y"),
            AckDecision::Discard { reason: "y".into() }
        );
    }
}
