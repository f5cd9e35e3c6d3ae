//! Error types for the protocol layer.

/// Errors raised while turning frames into messages and back.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound message failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not a well-formed message: bad JSON, unknown `type`
    /// tag, or a missing required field such as a signal's `target`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but breaks a field rule (empty name,
    /// non-finite coordinate, ...). Dropped at the boundary; the
    /// connection stays open.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ProtocolError {
    /// `true` for errors the client caused with a malformed message.
    pub fn is_client_fault(&self) -> bool {
        match self {
            #[cfg(feature = "json")]
            Self::Encode(_) => false,
            #[cfg(feature = "json")]
            Self::Decode(_) => true,
            Self::InvalidPayload(_) => true,
        }
    }
}
