//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means a serialization problem — the bytes
//! and the expected shape disagree — never a broker or game-rule
//! problem. Consumers treat any decode-side variant as a permanently
//! invalid message (discard to the dead-letter sink, never retry).

/// Errors that can occur while encoding or decoding payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// JSON serialization failed (turning a Rust type into bytes).
    #[error("json encode failed: {0}")]
    JsonEncode(#[source] serde_json::Error),

    /// JSON deserialization failed — malformed bytes, missing fields,
    /// or wrong field types.
    #[error("json decode failed: {0}")]
    JsonDecode(#[source] serde_json::Error),

    /// Binary serialization failed.
    #[error("binary encode failed: {0}")]
    BinaryEncode(#[source] bincode::Error),

    /// Binary deserialization failed — truncated or corrupt payload.
    #[error("binary decode failed: {0}")]
    BinaryDecode(#[source] bincode::Error),

    /// The delivery's content-type tag doesn't match the consuming
    /// codec, so the payload was produced by a different encoding.
    #[error("content type mismatch: expected {expected}, got {actual}")]
    ContentType {
        expected: &'static str,
        actual: String,
    },
}
