//! Peer session error types.

use std::io;
use thiserror::Error;

use shoal_proto::{CatalogError, WireError};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The action requires a completed JOIN.
    #[error("{action} requires a completed JOIN")]
    NotJoined { action: &'static str },

    /// The transport failed mid-action: refused, reset, or closed before a
    /// full frame was exchanged.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The registry or remote peer did not answer in time.
    #[error("{action} timed out")]
    Timeout { action: &'static str },

    /// The shared-file catalog could not be built.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A request could not be encoded.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The remote peer refused a FETCH request.
    #[error("peer rejected fetch with status {status}")]
    FetchRejected { status: u8 },
}

impl SessionError {
    /// Whether the caller can simply retry or correct the request, as
    /// opposed to the connection being in doubt.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SessionError::Transport(_))
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        let not_joined = SessionError::NotJoined { action: "SEARCH" };
        assert!(not_joined.is_recoverable());

        let rejected = SessionError::FetchRejected { status: 1 };
        assert!(rejected.is_recoverable());

        let transport =
            SessionError::Transport(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(!transport.is_recoverable());
    }
}
