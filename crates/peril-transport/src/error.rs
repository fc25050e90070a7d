//! Error types for the transport layer.

use peril_protocol::ProtocolError;

/// Errors that can occur talking to the broker.
///
/// Topology variants are fatal to the declaring process (setup is not
/// retried — the caller restarts); publish errors surface to the caller,
/// which decides whether they are fatal.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connecting to the broker failed.
    #[error("broker connection failed: {0}")]
    Connect(#[source] lapin::Error),

    /// Opening a channel failed.
    #[error("channel open failed: {0}")]
    Channel(#[source] lapin::Error),

    /// Declaring an exchange or declaring/binding a queue failed —
    /// broker unreachable or a name conflict with incompatible
    /// properties.
    #[error("topology declaration failed: {0}")]
    Topology(#[source] lapin::Error),

    /// Publishing a message was rejected by the broker.
    #[error("publish failed: {0}")]
    Publish(#[source] lapin::Error),

    /// Starting a consumer on a queue failed.
    #[error("consume failed: {0}")]
    Consume(#[source] lapin::Error),

    /// A payload could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
