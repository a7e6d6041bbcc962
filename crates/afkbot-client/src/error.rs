//! Error types for the client layer.

use afkbot_protocol::ProtocolError;
use afkbot_transport::TransportError;

/// Errors talking to the game client (through the bridge).
///
/// This is the "connection error" class: anything here ends with the
/// session receiving an `End` event sooner or later.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The link to the bridge failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The command channel is gone: the link was torn down.
    #[error("bot connection closed")]
    Closed,
}

impl ClientError {
    /// Whether this looks like "the server is offline".
    pub fn is_connection_refused_or_reset(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connection_refused_or_reset(),
            Self::Protocol(_) | Self::Closed => false,
        }
    }
}

/// Whether an error message reported by the game client means the server
/// refused or reset the connection.
///
/// The bridge forwards Node-style socket errors verbatim, so the errno
/// names are what to look for.
pub fn is_offline_message(message: &str) -> bool {
    message.contains("ECONNREFUSED") || message.contains("ECONNRESET")
}
