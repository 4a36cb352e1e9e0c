//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_REGISTRY_PORT, DEFAULT_SHARED_DIR};

/// Shoal file-sharing peer.
#[derive(Parser, Debug, Clone)]
#[command(name = "shoal-peer")]
#[command(about = "Interactive peer for the Shoal file-sharing registry")]
#[command(version)]
pub struct Cli {
    /// Registry host to connect to.
    pub host: String,

    /// Registry TCP port.
    #[arg(long, default_value_t = DEFAULT_REGISTRY_PORT)]
    pub port: u16,

    /// This peer's identifier; must be unique across the network.
    #[arg(long)]
    pub peer_id: u32,

    /// Directory whose files are advertised on PUBLISH.
    #[arg(long, default_value = DEFAULT_SHARED_DIR)]
    pub shared_dir: PathBuf,

    /// Seconds to wait when establishing connections.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Seconds to wait on a single request before giving up; waits
    /// indefinitely when unset.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
