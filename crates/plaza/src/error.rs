//! Unified error type for Plaza.

use plaza_protocol::ProtocolError;
use plaza_transport::TransportError;
use plaza_world::WorldError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts layer errors automatically. Registry and zone failures
/// reach this level inside [`WorldError`].
#[derive(Debug, thiserror::Error)]
pub enum PlazaError {
    /// Listener, handshake, send or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode, decode or field validation failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The world actor refused the request or is gone.
    #[error(transparent)]
    World(#[from] WorldError),
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use plaza_protocol::PlayerId;
    use plaza_registry::RegistryError;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::HandshakeTimeout(Duration::from_secs(3));
        let plaza_err: PlazaError = err.into();
        assert!(matches!(plaza_err, PlazaError::Transport(_)));
        assert!(plaza_err.to_string().contains("3s"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidPayload("bad".into());
        let plaza_err: PlazaError = err.into();
        assert!(matches!(plaza_err, PlazaError::Protocol(_)));
    }

    #[test]
    fn test_from_world_error_keeps_registry_message() {
        let err = WorldError::from(RegistryError::DuplicateConnection(PlayerId(3)));
        let plaza_err: PlazaError = err.into();
        assert!(matches!(
            plaza_err,
            PlazaError::World(WorldError::Registry(_))
        ));
        assert!(plaza_err.to_string().contains("P-3"));
    }

    #[test]
    fn test_from_world_error() {
        let plaza_err: PlazaError = WorldError::Unavailable.into();
        assert!(matches!(plaza_err, PlazaError::World(_)));
    }
}
