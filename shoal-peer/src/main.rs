//! Shoal peer binary.
//!
//! Connects to the registry, then hands control to the interactive
//! command loop.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shoal_peer::cli::Cli;
use shoal_peer::config::PeerConfig;
use shoal_peer::repl::Repl;
use shoal_peer::session::PeerSession;
use shoal_peer::transport::TcpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Shoal Peer v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = PeerConfig::from_cli(&cli);

    // A failed initial connection exits non-zero.
    let transport = TcpTransport::connect(
        &config.registry_host,
        config.registry_port,
        config.connect_timeout,
    )
    .await
    .with_context(|| {
        format!(
            "failed to connect to registry at {}:{}",
            config.registry_host, config.registry_port
        )
    })?;

    tracing::info!(addr = %transport.peer_addr(), "connected to registry");

    let session =
        PeerSession::new(transport, config.peer_id).with_request_timeout(config.request_timeout);

    Repl::new(session, config).run().await
}
