use std::io::ErrorKind;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Opening the connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The bridge URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Whether the peer refused or reset the connection.
    ///
    /// This is the "server is offline" signal: the bridge (or the game
    /// server behind it) is not accepting connections right now.
    pub fn is_connection_refused_or_reset(&self) -> bool {
        let io = match self {
            Self::ConnectFailed(e) | Self::SendFailed(e) | Self::ReceiveFailed(e) => e,
            Self::ConnectionClosed(_) | Self::InvalidUrl(_) => return false,
        };
        matches!(
            io.kind(),
            ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_is_detected() {
        let err = TransportError::ConnectFailed(ErrorKind::ConnectionRefused.into());
        assert!(err.is_connection_refused_or_reset());
    }

    #[test]
    fn test_reset_on_receive_is_detected() {
        let err = TransportError::ReceiveFailed(ErrorKind::ConnectionReset.into());
        assert!(err.is_connection_refused_or_reset());
    }

    #[test]
    fn test_other_errors_are_not_offline() {
        let err = TransportError::SendFailed(ErrorKind::BrokenPipe.into());
        assert!(!err.is_connection_refused_or_reset());
        assert!(!TransportError::InvalidUrl("nope".into()).is_connection_refused_or_reset());
        assert!(!TransportError::ConnectionClosed("bye".into()).is_connection_refused_or_reset());
    }
}
