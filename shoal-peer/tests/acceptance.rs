//! Acceptance tests for the peer against a scripted registry.
//!
//! These tests run the real session and transport over loopback TCP
//! against an in-process registry that verifies every byte the peer
//! sends and answers with canned responses.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use shoal_peer::fetch;
use shoal_peer::session::{PeerSession, SessionState};
use shoal_peer::transport::TcpTransport;

/// Read one NUL-terminated name from the stream.
async fn read_name(stream: &mut TcpStream) -> String {
    let mut name = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        stream.read_exact(&mut byte).await.unwrap();
        if byte[0] == 0 {
            break;
        }
        name.push(byte[0]);
    }
    String::from_utf8(name).unwrap()
}

/// Scripted registry: verifies JOIN, PUBLISH, and SEARCH frames and
/// answers the SEARCH with `response`.
fn spawn_registry(
    listener: TcpListener,
    expected_peer_id: u32,
    expected_files: Vec<String>,
    expected_query: String,
    response: [u8; 10],
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // JOIN
        let mut join = [0u8; 5];
        stream.read_exact(&mut join).await.unwrap();
        assert_eq!(join[0], 0x00);
        assert_eq!(
            u32::from_be_bytes(join[1..5].try_into().unwrap()),
            expected_peer_id
        );

        // PUBLISH
        let mut header = [0u8; 5];
        stream.read_exact(&mut header).await.unwrap();
        assert_eq!(header[0], 0x01);
        let count = u32::from_be_bytes(header[1..5].try_into().unwrap());
        assert_eq!(count as usize, expected_files.len());

        let mut names = Vec::new();
        for _ in 0..count {
            names.push(read_name(&mut stream).await);
        }
        names.sort_unstable();
        let mut expected = expected_files.clone();
        expected.sort_unstable();
        assert_eq!(names, expected);

        // SEARCH
        let mut action = [0u8; 1];
        stream.read_exact(&mut action).await.unwrap();
        assert_eq!(action[0], 0x02);
        assert_eq!(read_name(&mut stream).await, expected_query);

        stream.write_all(&response).await.unwrap();
    })
}

async fn bind_registry() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn connect_session(addr: SocketAddr, peer_id: u32) -> PeerSession<TcpTransport> {
    let transport =
        TcpTransport::connect(&addr.ip().to_string(), addr.port(), Duration::from_secs(5))
            .await
            .unwrap();
    PeerSession::new(transport, peer_id).with_request_timeout(Some(Duration::from_secs(5)))
}

#[tokio::test]
async fn join_publish_search_found() {
    let (listener, addr) = bind_registry().await;

    let shared = tempfile::tempdir().unwrap();
    std::fs::write(shared.path().join("movie.mp4"), b"film").unwrap();
    std::fs::write(shared.path().join("song.ogg"), b"tune").unwrap();

    let mut response = [0u8; 10];
    response[0..4].copy_from_slice(&7u32.to_be_bytes());
    response[4..8].copy_from_slice(&[127, 0, 0, 1]);
    response[8..10].copy_from_slice(&9000u16.to_be_bytes());

    let registry = spawn_registry(
        listener,
        42,
        vec!["movie.mp4".to_string(), "song.ogg".to_string()],
        "movie.mp4".to_string(),
        response,
    );

    let mut session = connect_session(addr, 42).await;
    session.join().await.unwrap();
    assert_eq!(session.state(), SessionState::Joined);

    let published = session.publish(shared.path()).await.unwrap();
    assert_eq!(published, 2);

    let result = session.search("movie.mp4").await.unwrap();
    assert!(!result.is_not_found());
    assert_eq!(result.peer_id, 7);
    assert_eq!(result.socket_addr().to_string(), "127.0.0.1:9000");

    registry.await.unwrap();
}

#[tokio::test]
async fn search_answers_not_found_sentinel() {
    let (listener, addr) = bind_registry().await;

    let shared = tempfile::tempdir().unwrap();
    std::fs::write(shared.path().join("movie.mp4"), b"film").unwrap();

    let registry = spawn_registry(
        listener,
        42,
        vec!["movie.mp4".to_string()],
        "nothing.bin".to_string(),
        [0u8; 10],
    );

    let mut session = connect_session(addr, 42).await;
    session.join().await.unwrap();
    session.publish(shared.path()).await.unwrap();

    let result = session.search("nothing.bin").await.unwrap();
    assert!(result.is_not_found());

    registry.await.unwrap();
}

#[tokio::test]
async fn registry_closing_mid_response_is_transport_failure() {
    let (listener, addr) = bind_registry().await;

    // A registry that accepts the JOIN and SEARCH but closes after 4 of
    // the 10 response bytes.
    let registry = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut join = [0u8; 5];
        stream.read_exact(&mut join).await.unwrap();

        let mut action = [0u8; 1];
        stream.read_exact(&mut action).await.unwrap();
        assert_eq!(action[0], 0x02);
        read_name(&mut stream).await;

        stream.write_all(&[0, 0, 0, 7]).await.unwrap();
    });

    let mut session = connect_session(addr, 42).await;
    session.join().await.unwrap();

    let err = session.search("movie.mp4").await.unwrap_err();
    assert!(matches!(
        err,
        shoal_peer::error::SessionError::Transport(_)
    ));

    registry.await.unwrap();
}

#[tokio::test]
async fn search_then_fetch_from_holding_peer() {
    // The holding peer serves the file body after a zero status byte.
    let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let holder_addr = match holder.local_addr().unwrap() {
        SocketAddr::V4(v4) => v4,
        other => panic!("unexpected address family: {other}"),
    };
    let holder_task = tokio::spawn(async move {
        let (mut stream, _) = holder.accept().await.unwrap();
        let mut action = [0u8; 1];
        stream.read_exact(&mut action).await.unwrap();
        assert_eq!(action[0], 0x03);
        assert_eq!(read_name(&mut stream).await, "movie.mp4");

        stream.write_all(&[0x00]).await.unwrap();
        stream.write_all(b"feature presentation").await.unwrap();
    });

    let (listener, addr) = bind_registry().await;
    let shared = tempfile::tempdir().unwrap();
    std::fs::write(shared.path().join("old.bin"), b"x").unwrap();

    let mut response = [0u8; 10];
    response[0..4].copy_from_slice(&9u32.to_be_bytes());
    response[4..8].copy_from_slice(&holder_addr.ip().octets());
    response[8..10].copy_from_slice(&holder_addr.port().to_be_bytes());

    let registry = spawn_registry(
        listener,
        42,
        vec!["old.bin".to_string()],
        "movie.mp4".to_string(),
        response,
    );

    let mut session = connect_session(addr, 42).await;
    session.join().await.unwrap();
    session.publish(shared.path()).await.unwrap();

    let result = session.search("movie.mp4").await.unwrap();
    assert_eq!(result.peer_id, 9);

    let dest = tempfile::tempdir().unwrap();
    let (path, bytes) = fetch::download(
        result.socket_addr(),
        "movie.mp4",
        dest.path(),
        Duration::from_secs(5),
        Some(Duration::from_secs(5)),
    )
    .await
    .unwrap();

    assert_eq!(bytes, 20);
    assert_eq!(std::fs::read(path).unwrap(), b"feature presentation");

    registry.await.unwrap();
    holder_task.await.unwrap();
}
