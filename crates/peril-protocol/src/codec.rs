//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between Rust types and raw payload bytes. The
//! transport layer doesn't care HOW a message is serialized — it just
//! needs something implementing [`Codec`], plus the content-type tag it
//! stamps on each publication so consumers can detect a mismatch.
//!
//! Two implementations, used interchangeably over the same transport:
//! [`JsonCodec`] (human-inspectable — moves, wars, pause signals) and
//! [`BincodeCodec`] (compact binary — the high-volume game-log stream).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because codecs are carried into long-lived
/// delivery-loop tasks. The `encode`/`decode` methods are generic: any
/// `T: Serialize` / `T: DeserializeOwned` works, so one codec serves
/// every wire type.
pub trait Codec: Send + Sync + 'static {
    /// The content-type tag stamped on publications using this codec.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into payload bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes payload bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Checks a delivery's content-type tag against this codec.
    ///
    /// A mismatch means the payload was produced by a different codec
    /// and would decode to garbage (or worse, to a wrong-but-valid
    /// value); callers treat it like any other decode failure.
    fn verify_content_type(&self, actual: Option<&str>) -> Result<(), ProtocolError> {
        match actual {
            Some(tag) if tag == self.content_type() => Ok(()),
            other => Err(ProtocolError::ContentType {
                expected: self.content_type(),
                actual: other.unwrap_or("<none>").to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] using JSON via `serde_json`.
///
/// Human-readable, so pause/move/war traffic can be inspected straight
/// off the broker's management UI. The tradeoff is size, which is why
/// the chatty game-log stream uses [`BincodeCodec`] instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::JsonEncode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::JsonDecode)
    }
}

// ---------------------------------------------------------------------------
// BincodeCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] using the compact `bincode` binary format.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn content_type(&self) -> &'static str {
        "application/bincode"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(value).map_err(ProtocolError::BinaryEncode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        bincode::deserialize(data).map_err(ProtocolError::BinaryDecode)
    }
}

// =========================================================================
// Tests
// =========================================================================
