//! Unified error type for the Peril processes.

use peril_game::GameError;
use peril_protocol::ProtocolError;
use peril_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The binaries deal with this single type; the `#[from]` attributes
/// let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PerilError {
    /// A transport-level error (connection, topology, publish, consume).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, content type).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level error (rules violation, state task gone).
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_game_error() {
        let err = GameError::UnknownTerritory("atlantis".into());
        let peril_err: PerilError = err.into();
        assert!(matches!(peril_err, PerilError::Game(_)));
        assert!(peril_err.to_string().contains("atlantis"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::ContentType {
            expected: "application/json",
            actual: "text/plain".into(),
        };
        let peril_err: PerilError = err.into();
        assert!(matches!(peril_err, PerilError::Protocol(_)));
    }
}
