//! Exchange and queue declaration.
//!
//! Topology is declared idempotently at process start and shared by
//! name across processes: whichever process comes up first creates the
//! exchanges and queues, the rest re-declare them with identical
//! properties. A declaration error (broker unreachable, name conflict
//! with incompatible properties) is fatal to the declaring process —
//! setup is never retried, the operator restarts.
//!
//! Every consumer queue is declared with a dead-letter rule pointing at
//! the fixed fanout exchange, so a discarded message lands in an
//! inspectable sink instead of vanishing.

use lapin::options::{
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind, Queue};

use peril_protocol::routing;

use crate::TransportError;

/// Queue retention policy.
///
/// The two classes map to fixed AMQP property triples:
///
/// | class     | durable | auto_delete | exclusive |
/// |-----------|---------|-------------|-----------|
/// | Durable   | yes     | no          | no        |
/// | Transient | no      | yes         | yes       |
///
/// Durable queues survive restarts and are shared by competing
/// consumers (the war and game-log queues). Transient queues belong to
/// one connection and disappear with it (per-client pause and move
/// queues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Survives restarts, shared by multiple consumers.
    Durable,
    /// Exclusive to one connection, deleted when it closes.
    Transient,
}

impl Durability {
    /// The queue-declare options this class maps to.
    pub fn queue_options(self) -> QueueDeclareOptions {
        match self {
            Self::Durable => QueueDeclareOptions {
                durable: true,
                auto_delete: false,
                exclusive: false,
                ..QueueDeclareOptions::default()
            },
            Self::Transient => QueueDeclareOptions {
                durable: false,
                auto_delete: true,
                exclusive: true,
                ..QueueDeclareOptions::default()
            },
        }
    }
}

/// Declares a durable exchange of the given kind. Idempotent.
pub async fn declare_exchange(
    channel: &Channel,
    name: &str,
    kind: ExchangeKind,
) -> Result<(), TransportError> {
    channel
        .exchange_declare(
            name,
            kind,
            ExchangeDeclareOptions {
                durable: true,
                ..ExchangeDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(TransportError::Topology)?;
    tracing::debug!(exchange = name, "exchange declared");
    Ok(())
}

/// Declares a queue with the given durability class and binds it to an
/// exchange under a routing-key pattern.
///
/// The queue's arguments always include
/// `x-dead-letter-exchange = peril_dlx`, so rejected messages are
/// redirected rather than dropped.
pub async fn declare_and_bind_queue(
    channel: &Channel,
    exchange: &str,
    queue: &str,
    routing_key: &str,
    durability: Durability,
) -> Result<Queue, TransportError> {
    let mut args = FieldTable::default();
    args.insert(
        "x-dead-letter-exchange".into(),
        AMQPValue::LongString(routing::EXCHANGE_PERIL_DLX.into()),
    );

    let declared = channel
        .queue_declare(queue, durability.queue_options(), args)
        .await
        .map_err(TransportError::Topology)?;

    channel
        .queue_bind(
            queue,
            exchange,
            routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(TransportError::Topology)?;

    tracing::debug!(
        queue,
        exchange,
        routing_key,
        ?durability,
        "queue declared and bound"
    );
    Ok(declared)
}

/// Declares the dead-letter sink: the fanout exchange plus one durable
/// queue bound to it, so every dead-lettered message is retained for
/// inspection.
///
/// The sink queue itself carries no dead-letter rule — a message
/// rejected from the sink is gone, which is the floor of the design.
pub async fn declare_dead_letter_sink(
    channel: &Channel,
) -> Result<(), TransportError> {
    declare_exchange(channel, routing::EXCHANGE_PERIL_DLX, ExchangeKind::Fanout)
        .await?;

    channel
        .queue_declare(
            routing::DEAD_LETTER_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(TransportError::Topology)?;

    // Fanout ignores the routing key.
    channel
        .queue_bind(
            routing::DEAD_LETTER_QUEUE,
            routing::EXCHANGE_PERIL_DLX,
            "",
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(TransportError::Topology)?;

    tracing::debug!("dead-letter sink declared");
    Ok(())
}
