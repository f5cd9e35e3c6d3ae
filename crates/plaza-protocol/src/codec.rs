//! Frame codecs.
//!
//! The handler never calls `serde_json` directly; it goes through a
//! [`Codec`] so the wire encoding can change without touching the server.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts messages to frames and frames back to messages.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into one frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Parses one frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] for malformed or mistyped frames.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// JSON codec. Browser clients speak this natively.
///
/// ```rust
/// use plaza_protocol::{ClientMessage, Codec, Facing, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::Move { x: 12.0, y: -4.5, facing: Facing::Left };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, PlayerId};

    #[test]
    fn test_decode_signal_without_target_is_client_fault() {
        let err = JsonCodec
            .decode::<ClientMessage>(br#"{"type":"Signal","payload":"sdp"}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
        assert!(err.is_client_fault());
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let err = JsonCodec.decode::<ClientMessage>(b"not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_encode_player_id_is_plain_number() {
        let bytes = JsonCodec.encode(&PlayerId(9)).unwrap();
        assert_eq!(bytes, b"9");
    }
}
