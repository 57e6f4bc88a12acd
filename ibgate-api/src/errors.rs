//! Error types for the ibgate-api library.

use thiserror::Error;

use crate::protocol::client_errors::{self, ClientError};

/// Top-level error type for the IB API client core.
#[derive(Debug, Error)]
pub enum IBApiError {
    /// TCP dial or handshake failure.
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to encode a request message.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A field could not be parsed; the frame is desynchronized.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Protocol-level violation (bad frame length, version mismatch, ...).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The server asked us to reconnect elsewhere.
    #[error("Redirected to {0}")]
    Redirect(String),

    /// The negotiated server version is outside the supported range.
    #[error("Unsupported server version {0}")]
    UnsupportedVersion(i32),

    #[error("Already connected")]
    AlreadyConnected,

    /// Dial did not complete within the configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Peer closed the connection.
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// I/O error from the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IBApiError {
    /// The client error condition this error is reported as through
    /// [`Wrapper::error`](crate::wrapper::Wrapper::error).
    pub fn client_error(&self) -> ClientError {
        match self {
            IBApiError::ConnectFailed(_) | IBApiError::Redirect(_) | IBApiError::Timeout(_) => {
                client_errors::CONNECT_FAIL
            }
            IBApiError::UnsupportedVersion(_) => client_errors::UPDATE_TWS,
            IBApiError::AlreadyConnected => client_errors::ALREADY_CONNECTED,
            IBApiError::Decoding(_) | IBApiError::Encoding(_) => client_errors::BAD_MESSAGE,
            IBApiError::Protocol(_) => client_errors::BAD_LENGTH,
            IBApiError::Disconnected(_) | IBApiError::Io(_) => client_errors::SOCKET_EXCEPTION,
        }
    }

    pub(crate) fn decoding(what: &str, raw: &str, err: impl std::fmt::Display) -> Self {
        IBApiError::Decoding(format!("invalid {what} '{raw}': {err}"))
    }
}

/// Convenience Result type for this library.
pub type Result<T> = std::result::Result<T, IBApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_client_error_codes() {
        assert_eq!(IBApiError::ConnectFailed("x".into()).client_error().code, 502);
        assert_eq!(IBApiError::Timeout("x".into()).client_error().code, 502);
        assert_eq!(IBApiError::Decoding("x".into()).client_error().code, 508);
        assert_eq!(IBApiError::Protocol("x".into()).client_error().code, 507);
        assert_eq!(IBApiError::UnsupportedVersion(99).client_error().code, 503);
        assert_eq!(IBApiError::AlreadyConnected.client_error().code, 501);
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(IBApiError::from(io).client_error().code, 509);
    }

    #[test]
    fn display_includes_detail() {
        let e = IBApiError::decoding("int", "abc", "invalid digit");
        assert_eq!(e.to_string(), "Decoding error: invalid int 'abc': invalid digit");
    }
}
