//! Peer-to-peer FETCH downloads.
//!
//! SEARCH tells us which peer holds a file; FETCH retrieves it over a
//! dedicated connection to that peer: `[0x03][filename\0]`, answered by a
//! one-byte status and, on success, the file octets until the sender
//! closes the connection.

use std::ffi::OsStr;
use std::future::Future;
use std::io;
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;

use shoal_proto::{wire, WireError};

use crate::error::{SessionError, SessionResult};
use crate::transport::{TcpTransport, Transport};

/// Copy buffer size for the download stream.
const COPY_BUF_BYTES: usize = 8 * 1024;

/// Download `filename` from `peer` into `dest_dir`.
///
/// Returns the written path and the number of body bytes received. A
/// non-zero status byte from the peer yields `FetchRejected` and writes
/// nothing.
pub async fn download(
    peer: SocketAddrV4,
    filename: &str,
    dest_dir: &Path,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
) -> SessionResult<(PathBuf, u64)> {
    // A name with path separators would escape dest_dir.
    if Path::new(filename).file_name() != Some(OsStr::new(filename)) {
        return Err(WireError::InvalidFilename {
            name: filename.to_string(),
            reason: "path separators",
        }
        .into());
    }

    let frame = wire::encode_fetch(filename)?;

    let mut transport =
        TcpTransport::connect(&peer.ip().to_string(), peer.port(), connect_timeout).await?;

    timed(request_timeout, transport.send(&frame)).await?;

    let mut status = [0u8; 1];
    timed(request_timeout, transport.recv_exact(&mut status)).await?;
    if status[0] != 0 {
        return Err(SessionError::FetchRejected { status: status[0] });
    }

    fs::create_dir_all(dest_dir).await?;

    // Stream into a scratch name first. The final name appears only after
    // the remote closes cleanly, so a transfer that dies mid-body never
    // leaves a truncated file where the next PUBLISH would advertise it.
    let part = dest_dir.join(format!("{filename}.part"));
    match receive_body(transport, &part, request_timeout).await {
        Ok(written) => {
            let dest = dest_dir.join(filename);
            fs::rename(&part, &dest).await?;
            tracing::info!(filename, peer = %peer, bytes = written, "fetched file");
            Ok((dest, written))
        }
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&part).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = ?part, error = %cleanup, "failed to remove partial download");
                }
            }
            Err(err)
        }
    }
}

/// Receive the file body into `path` until the remote closes.
async fn receive_body(
    transport: TcpTransport,
    path: &Path,
    request_timeout: Option<Duration>,
) -> SessionResult<u64> {
    let mut file = fs::File::create(path).await?;
    let mut stream = transport.into_inner();
    let mut buf = vec![0u8; COPY_BUF_BYTES];
    let mut written = 0u64;
    loop {
        let read = timed(request_timeout, stream.read(&mut buf)).await?;
        if read == 0 {
            break;
        }
        file.write_all(&buf[..read]).await?;
        written += read as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Bound an I/O future by the optional request timeout.
async fn timed<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = io::Result<T>>,
) -> SessionResult<T> {
    match limit {
        Some(limit) => match timeout(limit, fut).await {
            Ok(result) => result.map_err(SessionError::Transport),
            Err(_) => Err(SessionError::Timeout { action: "FETCH" }),
        },
        None => fut.await.map_err(SessionError::Transport),
    }
}
