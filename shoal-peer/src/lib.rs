//! Shoal registry peer library.
//!
//! This crate drives the `shoal-proto` protocol engine over a real
//! connection: the transport abstraction, the JOIN/PUBLISH/SEARCH session
//! state machine, peer-to-peer FETCH downloads, and the interactive
//! command loop used by the `shoal-peer` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod repl;
pub mod session;
pub mod transport;

// Re-export main types
pub use config::PeerConfig;
pub use error::{SessionError, SessionResult};
pub use session::{PeerSession, SessionState};
pub use transport::{TcpTransport, Transport};
