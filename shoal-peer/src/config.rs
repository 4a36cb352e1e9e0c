//! Peer configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

/// Default registry TCP port.
pub const DEFAULT_REGISTRY_PORT: u16 = 5432;

/// Default shared-files directory, relative to the working directory.
pub const DEFAULT_SHARED_DIR: &str = "SharedFiles";

/// Default timeout for establishing connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Complete peer configuration.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Registry host to connect to.
    pub registry_host: String,

    /// Registry TCP port.
    pub registry_port: u16,

    /// This peer's identifier. Uniqueness across the network is asserted
    /// by the operator and enforced by the registry, not validated here.
    pub peer_id: u32,

    /// Directory whose files are advertised on PUBLISH and that receives
    /// FETCH downloads.
    pub shared_dir: PathBuf,

    /// Timeout for establishing connections.
    pub connect_timeout: Duration,

    /// Per-request timeout. `None` blocks until the remote answers or the
    /// connection closes.
    pub request_timeout: Option<Duration>,

    /// Log level.
    pub log_level: String,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            registry_host: "127.0.0.1".to_string(),
            registry_port: DEFAULT_REGISTRY_PORT,
            peer_id: 0,
            shared_dir: PathBuf::from(DEFAULT_SHARED_DIR),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
            log_level: "warn".to_string(),
        }
    }
}

impl PeerConfig {
    /// Create a peer configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            registry_host: cli.host.clone(),
            registry_port: cli.port,
            peer_id: cli.peer_id,
            shared_dir: cli.shared_dir.clone(),
            connect_timeout: Duration::from_secs(cli.connect_timeout_secs),
            request_timeout: cli.request_timeout_secs.map(Duration::from_secs),
            log_level: cli.log_level.clone(),
        }
    }

    /// Set the peer identifier.
    pub fn with_peer_id(mut self, peer_id: u32) -> Self {
        self.peer_id = peer_id;
        self
    }

    /// Set the shared-files directory.
    pub fn with_shared_dir(mut self, dir: PathBuf) -> Self {
        self.shared_dir = dir;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}
