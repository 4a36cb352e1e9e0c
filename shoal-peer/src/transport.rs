//! Byte-stream transport to the registry and to remote peers.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A bidirectional ordered byte stream.
///
/// `send` completes only once every byte has been written; `recv_exact`
/// completes only once the buffer is full. A connection that closes short
/// of either guarantee yields an error, so callers never observe a partial
/// frame.
pub trait Transport {
    /// Write all bytes, looping over partial writes.
    fn send(&mut self, bytes: &[u8]) -> impl std::future::Future<Output = io::Result<()>>;

    /// Read exactly `buf.len()` bytes. EOF before the buffer fills is an
    /// `UnexpectedEof` error.
    fn recv_exact(&mut self, buf: &mut [u8]) -> impl std::future::Future<Output = io::Result<()>>;
}

/// TCP-backed transport.
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl TcpTransport {
    /// Resolve `host:port` and connect, bounded by `connect_timeout`.
    pub async fn connect(host: &str, port: u16, connect_timeout: Duration) -> io::Result<Self> {
        let stream = match timeout(connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {host}:{port} timed out"),
                ));
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            tracing::warn!(error = %e, "failed to set TCP_NODELAY");
        }

        let peer_addr = stream.peer_addr()?;
        tracing::debug!(addr = %peer_addr, "connection established");

        Ok(Self { stream, peer_addr })
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Give up framing guarantees and expose the raw stream, for
    /// read-until-close transfers.
    pub fn into_inner(self) -> TcpStream {
        self.stream
    }
}

impl Transport for TcpTransport {
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await
    }

    async fn recv_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.stream.read_exact(buf).await.map(|_| ())
    }
}
