//! Typed publication over a shared broker channel.

use std::future::Future;
use std::sync::Arc;

use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use peril_protocol::Codec;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::TransportError;

/// The outbound seam of the transport.
///
/// Handlers and command loops depend on this trait rather than on a
/// broker channel, so game logic can be exercised in tests with an
/// in-memory recorder instead of a running broker.
pub trait Publish: Send + Sync + 'static {
    /// Serializes `value` and publishes it to `exchange` under
    /// `routing_key` (non-mandatory, non-immediate).
    ///
    /// Returns an error on serialization failure or broker rejection;
    /// the caller decides whether that is fatal.
    fn publish<T: Serialize + Sync>(
        &self,
        exchange: &str,
        routing_key: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A [`Publish`] implementation over one lapin channel.
///
/// The channel is guarded by a mutex: publishes may originate from the
/// command loop and from several delivery loops at once, and a channel
/// is a serial protocol endpoint, not a concurrent one. Cloning the
/// publisher shares the same guarded channel.
#[derive(Clone)]
pub struct AmqpPublisher<C> {
    channel: Arc<Mutex<Channel>>,
    codec: C,
}

impl<C: Codec> AmqpPublisher<C> {
    /// Wraps a channel and the codec whose content type every
    /// publication will carry.
    pub fn new(channel: Channel, codec: C) -> Self {
        Self {
            channel: Arc::new(Mutex::new(channel)),
            codec,
        }
    }
}

impl<C: Codec + Clone> Publish for AmqpPublisher<C> {
    async fn publish<T: Serialize + Sync>(
        &self,
        exchange: &str,
        routing_key: &str,
        value: &T,
    ) -> Result<(), TransportError> {
        let payload = self.codec.encode(value)?;
        let properties = BasicProperties::default()
            .with_content_type(self.codec.content_type().into());

        let channel = self.channel.lock().await;
        channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await
            .map_err(TransportError::Publish)?
            .await
            .map_err(TransportError::Publish)?;

        tracing::trace!(exchange, routing_key, bytes = payload.len(), "published");
        Ok(())
    }
}
