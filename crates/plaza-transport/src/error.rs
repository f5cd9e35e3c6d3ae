use std::time::Duration;

/// Errors raised while moving bytes to or from a client.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The client did not finish the upgrade handshake in time.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener, accepting a socket, or upgrading it failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
