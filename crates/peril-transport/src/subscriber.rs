//! Per-queue delivery loops.
//!
//! [`subscribe`] spins up one independent Tokio task per queue. Within
//! a loop, deliveries are handled strictly one at a time (prefetch 1),
//! preserving per-queue ordering of handler invocations; across queues
//! the loops run fully concurrently and promise nothing about relative
//! order.

use std::future::Future;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions,
    BasicPublishOptions, BasicQosOptions,
};
use lapin::types::{AMQPValue, FieldTable, ShortString};
use lapin::{BasicProperties, Channel, Connection, Consumer};
use peril_protocol::Codec;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::{AckDecision, Durability, TransportError, topology};

/// Header carrying the requeue attempt counter.
const RETRY_COUNT_HEADER: &str = "x-retry-count";

/// Requeue attempts after which a message is dead-lettered instead.
///
/// Without a ceiling, a condition that never resolves (a recognition no
/// consumer ever claims) would cycle through the queue forever.
const RETRY_LIMIT: i64 = 5;

/// One row of the dispatch table: where a subscription's queue lives
/// and what it is bound to.
#[derive(Debug, Clone)]
pub struct QueueBinding {
    /// The exchange the queue is bound to.
    pub exchange: String,
    /// The queue name.
    pub queue: String,
    /// The binding pattern (may contain wildcards on a topic exchange).
    pub routing_key: String,
    /// Durable shared queue or transient per-connection queue.
    pub durability: Durability,
}

impl QueueBinding {
    /// Builds a binding row.
    pub fn new(
        exchange: impl Into<String>,
        queue: impl Into<String>,
        routing_key: impl Into<String>,
        durability: Durability,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            queue: queue.into(),
            routing_key: routing_key.into(),
            durability,
        }
    }
}

/// A typed message handler bound to one subscription.
///
/// Handlers are plain structs holding whatever they need (the game
/// handle, a publisher) as explicit fields — the ownership and
/// concurrency contract is visible in the type, not hidden in a
/// closure's captures. The only thing a handler can tell the transport
/// is the three-way [`AckDecision`].
pub trait Handler<T>: Send + Sync + 'static {
    /// Processes one decoded message and decides its fate.
    fn handle(&self, msg: T) -> impl Future<Output = AckDecision> + Send;
}

/// Declares and binds `binding`'s queue, then starts its delivery loop
/// on a fresh channel with prefetch 1.
///
/// Returns as soon as the consumer is registered; the returned handle
/// joins the loop task, which runs until the delivery stream closes
/// (connection or channel teardown). The loop is not restarted
/// automatically.
pub async fn subscribe<T, C, H>(
    conn: &Connection,
    binding: QueueBinding,
    codec: C,
    handler: H,
) -> Result<JoinHandle<()>, TransportError>
where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
    H: Handler<T>,
{
    let channel = conn
        .create_channel()
        .await
        .map_err(TransportError::Channel)?;

    topology::declare_and_bind_queue(
        &channel,
        &binding.exchange,
        &binding.queue,
        &binding.routing_key,
        binding.durability,
    )
    .await?;

    // One unacknowledged delivery at a time: a slow handler holds only
    // its own message, never a backlog.
    channel
        .basic_qos(1, BasicQosOptions::default())
        .await
        .map_err(TransportError::Consume)?;

    let consumer = channel
        .basic_consume(
            &binding.queue,
            "",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(TransportError::Consume)?;

    tracing::info!(
        queue = %binding.queue,
        pattern = %binding.routing_key,
        "subscribed"
    );

    Ok(tokio::spawn(delivery_loop(
        channel, binding, consumer, codec, handler,
    )))
}

async fn delivery_loop<T, C, H>(
    channel: Channel,
    binding: QueueBinding,
    mut consumer: Consumer,
    codec: C,
    handler: H,
) where
    T: DeserializeOwned + Send + 'static,
    C: Codec,
    H: Handler<T>,
{
    while let Some(attempt) = consumer.next().await {
        let delivery = match attempt {
            Ok(delivery) => delivery,
            Err(error) => {
                tracing::error!(queue = %binding.queue, %error, "consumer stream failed");
                break;
            }
        };

        // A payload that doesn't decode (or carries the wrong content
        // type) is permanently invalid: discard to the dead-letter sink
        // and keep serving. A malformed message must not take down a
        // long-running process.
        let content_type = delivery
            .properties
            .content_type()
            .as_ref()
            .map(ShortString::as_str);
        let decoded = codec
            .verify_content_type(content_type)
            .and_then(|()| codec.decode::<T>(&delivery.data));

        let decision = match decoded {
            Ok(msg) => handler.handle(msg).await,
            Err(error) => AckDecision::discard(format!("undecodable payload: {error}")),
        };

        if let Err(error) = apply_decision(&channel, &delivery, decision).await {
            tracing::error!(queue = %binding.queue, %error, "acknowledgement failed, stopping loop");
            break;
        }
    }

    tracing::info!(queue = %binding.queue, "delivery loop ended");
}

/// Translates a handler's decision into a broker acknowledgement.
async fn apply_decision(
    channel: &Channel,
    delivery: &Delivery,
    decision: AckDecision,
) -> Result<(), lapin::Error> {
    match decision {
        AckDecision::Ack => delivery.ack(BasicAckOptions::default()).await,
        AckDecision::Discard { reason } => {
            tracing::warn!(
                routing_key = %delivery.routing_key,
                %reason,
                "discarding delivery to dead-letter sink"
            );
            delivery
                .nack(BasicNackOptions {
                    requeue: false,
                    ..BasicNackOptions::default()
                })
                .await
        }
        AckDecision::Requeue { reason } => {
            let attempts = retry_count(&delivery.properties) + 1;
            if attempts >= RETRY_LIMIT {
                tracing::warn!(
                    routing_key = %delivery.routing_key,
                    attempts,
                    %reason,
                    "retry ceiling reached, dead-lettering"
                );
                delivery
                    .nack(BasicNackOptions {
                        requeue: false,
                        ..BasicNackOptions::default()
                    })
                    .await
            } else {
                tracing::debug!(
                    routing_key = %delivery.routing_key,
                    attempts,
                    %reason,
                    "requeueing delivery"
                );
                requeue_with_count(channel, delivery, attempts).await
            }
        }
    }
}

/// Requeues by republishing with an incremented attempt counter, then
/// acknowledging the original delivery. A plain broker nack-requeue
/// would redeliver with unchanged headers, so the attempt count could
/// never grow and the ceiling would never trip.
async fn requeue_with_count(
    channel: &Channel,
    delivery: &Delivery,
    attempts: i64,
) -> Result<(), lapin::Error> {
    let properties = with_retry_count(delivery.properties.clone(), attempts);
    let republished = channel
        .basic_publish(
            delivery.exchange.as_str(),
            delivery.routing_key.as_str(),
            BasicPublishOptions::default(),
            &delivery.data,
            properties,
        )
        .await;

    match republished {
        Ok(confirm) => match confirm.await {
            Ok(_) => delivery.ack(BasicAckOptions::default()).await,
            Err(error) => {
                tracing::warn!(%error, "republish unconfirmed, falling back to broker requeue");
                delivery
                    .nack(BasicNackOptions {
                        requeue: true,
                        ..BasicNackOptions::default()
                    })
                    .await
            }
        },
        Err(error) => {
            tracing::warn!(%error, "republish failed, falling back to broker requeue");
            delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..BasicNackOptions::default()
                })
                .await
        }
    }
}

/// Reads the attempt counter from a delivery's headers (0 if absent).
fn retry_count(properties: &BasicProperties) -> i64 {
    properties
        .headers()
        .as_ref()
        .and_then(|table| table.inner().get(&ShortString::from(RETRY_COUNT_HEADER)))
        .map_or(0, |value| match value {
            AMQPValue::LongLongInt(n) => *n,
            AMQPValue::LongInt(n) => i64::from(*n),
            AMQPValue::ShortInt(n) => i64::from(*n),
            _ => 0,
        })
}

/// Returns the properties with the attempt counter set to `attempts`.
fn with_retry_count(properties: BasicProperties, attempts: i64) -> BasicProperties {
    let mut headers = properties.headers().clone().unwrap_or_default();
    headers.insert(
        RETRY_COUNT_HEADER.into(),
        AMQPValue::LongLongInt(attempts),
    );
    properties.with_headers(headers)
}
