//! Registry session state machine.
//!
//! A session owns its transport and its JOIN state; PUBLISH and SEARCH are
//! refused until a JOIN has completed on the wire. One request is in flight
//! at a time: every operation is send-then-(optionally)-receive before the
//! next may begin.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::time::timeout;

use shoal_proto::{wire, SearchResponse, FileCatalog, SEARCH_RESPONSE_BYTES};

use crate::error::{SessionError, SessionResult};
use crate::transport::Transport;

/// State of the registry session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No JOIN has completed yet.
    #[default]
    Unjoined,
    /// JOIN sent; PUBLISH and SEARCH are allowed. The session never
    /// regresses from here.
    Joined,
}

impl SessionState {
    /// Check whether the session has joined the registry.
    pub fn is_joined(&self) -> bool {
        matches!(self, SessionState::Joined)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unjoined => write!(f, "unjoined"),
            SessionState::Joined => write!(f, "joined"),
        }
    }
}

/// A peer's session with the registry.
#[derive(Debug)]
pub struct PeerSession<T: Transport> {
    transport: T,
    peer_id: u32,
    state: SessionState,
    request_timeout: Option<Duration>,
}

impl<T: Transport> PeerSession<T> {
    /// Create a session over a connected transport. No bytes are exchanged
    /// until the first operation.
    pub fn new(transport: T, peer_id: u32) -> Self {
        Self {
            transport,
            peer_id,
            state: SessionState::Unjoined,
            request_timeout: None,
        }
    }

    /// Bound every transport call of every operation by `limit`. With no
    /// bound, operations block until the remote answers or the connection
    /// closes, as the original protocol does.
    pub fn with_request_timeout(mut self, limit: Option<Duration>) -> Self {
        self.request_timeout = limit;
        self
    }

    /// This peer's identifier. Uniqueness is the registry's concern.
    pub fn peer_id(&self) -> u32 {
        self.peer_id
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Register with the registry.
    ///
    /// Permitted in any state and idempotent from the caller's view; the
    /// transition to `Joined` happens only after the send completes, so a
    /// failed send leaves the session unjoined.
    pub async fn join(&mut self) -> SessionResult<()> {
        let frame = wire::encode_join(self.peer_id);
        self.send("JOIN", &frame).await?;

        if self.state != SessionState::Joined {
            tracing::debug!(
                from = %self.state,
                to = %SessionState::Joined,
                peer_id = self.peer_id,
                "session state transition"
            );
            self.state = SessionState::Joined;
        }

        tracing::info!(peer_id = self.peer_id, "joined registry");
        Ok(())
    }

    /// Advertise the shared directory's catalog to the registry.
    ///
    /// The catalog is rebuilt from the directory on every call. Catalog and
    /// encoding failures surface before any byte touches the transport;
    /// a partial file list is never sent. Returns the number of files
    /// published.
    pub async fn publish(&mut self, shared_dir: &Path) -> SessionResult<usize> {
        self.require_joined("PUBLISH")?;

        let catalog = FileCatalog::scan(shared_dir)?;
        let frame = wire::encode_publish(&catalog)?;
        self.send("PUBLISH", &frame).await?;

        tracing::info!(
            files = catalog.len(),
            bytes = frame.len(),
            "published catalog"
        );
        Ok(catalog.len())
    }

    /// Ask the registry which peer holds `filename`.
    ///
    /// Sends the request, then reads the fixed 10-byte response. A
    /// connection that closes short of 10 bytes is a transport failure.
    pub async fn search(&mut self, filename: &str) -> SessionResult<SearchResponse> {
        self.require_joined("SEARCH")?;

        let frame = wire::encode_search(filename)?;
        self.send("SEARCH", &frame).await?;

        let mut buf = [0u8; SEARCH_RESPONSE_BYTES];
        self.recv("SEARCH", &mut buf).await?;

        let response = SearchResponse::decode(buf);
        tracing::info!(filename, result = %response, "search answered");
        Ok(response)
    }

    fn require_joined(&self, action: &'static str) -> SessionResult<()> {
        if self.state.is_joined() {
            Ok(())
        } else {
            Err(SessionError::NotJoined { action })
        }
    }

    async fn send(&mut self, action: &'static str, bytes: &[u8]) -> SessionResult<()> {
        match self.request_timeout {
            Some(limit) => match timeout(limit, self.transport.send(bytes)).await {
                Ok(result) => result.map_err(SessionError::Transport),
                Err(_) => Err(SessionError::Timeout { action }),
            },
            None => self
                .transport
                .send(bytes)
                .await
                .map_err(SessionError::Transport),
        }
    }

    async fn recv(&mut self, action: &'static str, buf: &mut [u8]) -> SessionResult<()> {
        match self.request_timeout {
            Some(limit) => match timeout(limit, self.transport.recv_exact(buf)).await {
                Ok(result) => result.map_err(SessionError::Transport),
                Err(_) => Err(SessionError::Timeout { action }),
            },
            None => self
                .transport
                .recv_exact(buf)
                .await
                .map_err(SessionError::Transport),
        }
    }
}
