use http::StatusCode;
use std::error::Error as _;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Why a request to the stream path could not be upgraded. Variants are in
/// the order the checks run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("'upgrade' token not found in 'Connection' header")]
    MissingConnectionUpgrade,
    #[error("'websocket' token not found in 'Upgrade' header")]
    MissingUpgradeWebsocket,
    #[error("request method is not GET")]
    MethodNotGet,
    #[error("unsupported version: 13 not found in 'Sec-WebSocket-Version' header")]
    UnsupportedVersion,
    #[error("request origin not allowed")]
    OriginNotAllowed,
    #[error("'Sec-WebSocket-Key' header must be Base64 encoded value of 16-byte in length")]
    InvalidKey,
}

impl HandshakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandshakeError::MethodNotGet => StatusCode::METHOD_NOT_ALLOWED,
            HandshakeError::OriginNotAllowed => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// A transport failure that ends an open session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("read: {0}")]
    Read(#[source] axum::Error),
    #[error("write: {0}")]
    Write(#[source] axum::Error),
}

impl SessionError {
    /// The client went away without a close handshake.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SessionError::Read(e) => matches!(
                transport_error(e),
                Some(tungstenite::Error::Io(_))
                    | Some(tungstenite::Error::Protocol(
                        tungstenite::error::ProtocolError::ResetWithoutClosingHandshake
                    ))
            ),
            SessionError::Write(e) => matches!(
                transport_error(e),
                Some(tungstenite::Error::Io(_))
                    | Some(tungstenite::Error::ConnectionClosed)
                    | Some(tungstenite::Error::AlreadyClosed)
            ),
        }
    }
}

/// The websocket error wrapped inside an `axum::Error`, if that is what it holds.
pub(crate) fn transport_error(e: &axum::Error) -> Option<&tungstenite::Error> {
    e.source()?.downcast_ref::<tungstenite::Error>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(e: tungstenite::Error) -> axum::Error {
        axum::Error::new(e)
    }

    #[test]
    fn handshake_statuses() {
        assert_eq!(HandshakeError::MethodNotGet.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(HandshakeError::OriginNotAllowed.status(), StatusCode::FORBIDDEN);
        assert_eq!(HandshakeError::UnsupportedVersion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(HandshakeError::InvalidKey.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            HandshakeError::MissingConnectionUpgrade.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn session_error_names_the_failed_direction() {
        let err = SessionError::Write(wrap(tungstenite::Error::ConnectionClosed));
        assert!(err.to_string().starts_with("write: "));
        assert!(err.is_disconnect());
        let err = SessionError::Read(wrap(tungstenite::Error::AlreadyClosed));
        assert!(err.to_string().starts_with("read: "));
        assert!(!err.is_disconnect());
    }

    #[test]
    fn reset_without_handshake_is_a_disconnect() {
        let err = SessionError::Read(wrap(tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        )));
        assert!(err.is_disconnect());
        let err = SessionError::Read(wrap(tungstenite::Error::Capacity(
            tungstenite::error::CapacityError::MessageTooLong {
                size: 32,
                max_size: 8,
            },
        )));
        assert!(!err.is_disconnect());
    }

    #[test]
    fn foreign_errors_are_not_disconnects() {
        let err = SessionError::Read(axum::Error::new(std::fmt::Error));
        assert!(!err.is_disconnect());
        assert!(transport_error(&axum::Error::new(std::fmt::Error)).is_none());
    }
}
