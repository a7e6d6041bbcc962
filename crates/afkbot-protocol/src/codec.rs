//! Codec trait and implementations for bridge frames.
//!
//! The client layer doesn't care how a [`BotCommand`](crate::BotCommand)
//! becomes bytes, only that something implements [`Codec`]. JSON is the
//! only format today because the bridge is a scripting-language process.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to frames and decodes frames back.
///
/// `Send + Sync + 'static` because the codec is moved into the long-lived
/// pump tasks that drive a bridge connection.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or does
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use afkbot_protocol::{BotCommand, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&BotCommand::Chat { text: "hi".into() }).unwrap();
/// assert_eq!(bytes, br#"{"type":"Chat","text":"hi"}"#);
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
    use crate::{BotEvent, Control, BotCommand};

    #[test]
    fn test_decodes_bridge_kick() {
        let event: BotEvent = JsonCodec
            .decode(br#"{"type":"Kicked","reason":"idle too long"}"#)
            .unwrap();
        assert_eq!(event, BotEvent::Kicked { reason: "idle too long".into() });
    }

    #[test]
    fn test_set_control_wire_shape() {
        let bytes = JsonCodec
            .encode(&BotCommand::SetControl { control: Control::Jump, state: true })
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "SetControl");
        assert_eq!(json["control"], "jump");
        assert_eq!(json["state"], true);
    }

    #[test]
    fn test_unknown_event_type_is_decode_error() {
        let result: Result<BotEvent, _> = JsonCodec.decode(br#"{"type":"Teleport"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result: Result<BotEvent, _> = JsonCodec.decode(b"\x00\x01 not json");
        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("decode failed"));
    }
}
