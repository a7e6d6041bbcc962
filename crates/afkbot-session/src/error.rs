//! Error types for the session layer.

use std::time::Duration;

use afkbot_client::ClientError;

use crate::AuthStep;

/// Errors raised while running a session.
///
/// None of these end the process. A handshake error aborts the handshake
/// only; the session and its idle behaviors keep going. A session that
/// ends mid-handshake aborts the task rather than producing an error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server answered an auth command with something unexpected.
    /// `message` is the literal chat line that was received.
    #[error("unexpected {step} reply: \"{message}\"")]
    AuthMismatch { step: AuthStep, message: String },

    /// No reply arrived within the configured reply timeout.
    #[error("no {step} reply within {after:?}")]
    ReplyTimeout { step: AuthStep, after: Duration },

    /// Talking to the game client failed, e.g. the command channel closed.
    #[error(transparent)]
    Client(#[from] ClientError),
}
