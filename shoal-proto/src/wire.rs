//! Wire codec for registry requests and responses.
//!
//! Every request starts with a single action byte followed by the
//! action-specific payload:
//!
//! - JOIN: `[0x00][peer_id:4]`
//! - PUBLISH: `[0x01][count:4][name1\0][name2\0]...`
//! - SEARCH: `[0x02][filename\0]`
//! - FETCH: `[0x03][filename\0]`
//!
//! The SEARCH response is a fixed 10-byte frame:
//! `[peer_id:4][ipv4:4][port:2]`, all-zero meaning "not found".
//!
//! All multi-byte integers are big-endian, regardless of host order.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use bytes::{BufMut, BytesMut};

use crate::catalog::FileCatalog;
use crate::error::WireError;

/// Maximum number of files in a single PUBLISH request.
pub const MAX_CATALOG_FILES: usize = 12;

/// Maximum total size of a PUBLISH request in bytes.
pub const MAX_PUBLISH_BYTES: usize = 1200;

/// Maximum wire size of one filename, including its NUL terminator.
pub const MAX_NAME_WIRE_BYTES: usize = 100;

/// PUBLISH header size: 1 action byte + 4 count bytes.
pub const PUBLISH_HEADER_BYTES: usize = 5;

/// Fixed size of a SEARCH response.
pub const SEARCH_RESPONSE_BYTES: usize = 10;

/// Action codes, the first byte of every peer-to-registry request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    /// Register this peer with the registry.
    Join = 0,
    /// Advertise the shared-file catalog.
    Publish = 1,
    /// Ask which peer holds a named file.
    Search = 2,
    /// Request a file from another peer.
    Fetch = 3,
}

impl Action {
    /// Get a human-readable name for the action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Join => "JOIN",
            Action::Publish => "PUBLISH",
            Action::Search => "SEARCH",
            Action::Fetch => "FETCH",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check that a filename fits the per-entry wire limits.
pub fn validate_filename(name: &str) -> Result<(), WireError> {
    if name.is_empty() {
        return Err(WireError::InvalidFilename {
            name: name.to_string(),
            reason: "empty",
        });
    }
    if name.as_bytes().contains(&0) {
        return Err(WireError::InvalidFilename {
            name: name.to_string(),
            reason: "embedded NUL",
        });
    }
    // The NUL terminator counts against the 100-byte entry limit.
    if name.len() + 1 > MAX_NAME_WIRE_BYTES {
        return Err(WireError::InvalidFilename {
            name: name.to_string(),
            reason: "longer than 99 bytes",
        });
    }
    Ok(())
}

/// Encode a JOIN request. Always exactly 5 bytes.
pub fn encode_join(peer_id: u32) -> [u8; 5] {
    let mut frame = [0u8; 5];
    frame[0] = Action::Join as u8;
    frame[1..5].copy_from_slice(&peer_id.to_be_bytes());
    frame
}

/// Encode a PUBLISH request from a catalog.
///
/// Fails rather than truncating when the catalog violates the 12-file or
/// 1200-byte bound, so a caller never sends a partial file list.
pub fn encode_publish(catalog: &FileCatalog) -> Result<Vec<u8>, WireError> {
    if catalog.len() > MAX_CATALOG_FILES {
        return Err(WireError::CatalogOverflow {
            files: catalog.len(),
            bytes: catalog.wire_size(),
        });
    }

    let total = catalog.wire_size();
    if total > MAX_PUBLISH_BYTES {
        return Err(WireError::CatalogOverflow {
            files: catalog.len(),
            bytes: total,
        });
    }

    let mut frame = BytesMut::with_capacity(total);
    frame.put_u8(Action::Publish as u8);
    frame.put_u32(catalog.len() as u32);
    for entry in catalog.iter() {
        validate_filename(entry.name())?;
        frame.put_slice(entry.name().as_bytes());
        frame.put_u8(0);
    }

    Ok(frame.to_vec())
}

/// Encode a SEARCH request.
pub fn encode_search(filename: &str) -> Result<Vec<u8>, WireError> {
    encode_named_request(Action::Search, filename)
}

/// Encode a FETCH request.
pub fn encode_fetch(filename: &str) -> Result<Vec<u8>, WireError> {
    encode_named_request(Action::Fetch, filename)
}

/// Shared layout for the filename-carrying requests.
fn encode_named_request(action: Action, filename: &str) -> Result<Vec<u8>, WireError> {
    validate_filename(filename)?;

    let mut frame = BytesMut::with_capacity(1 + filename.len() + 1);
    frame.put_u8(action as u8);
    frame.put_slice(filename.as_bytes());
    frame.put_u8(0);

    Ok(frame.to_vec())
}

/// Decoded SEARCH response: the peer the registry believes holds the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResponse {
    /// Identifier of the holding peer.
    pub peer_id: u32,
    /// IPv4 address of the holding peer.
    pub addr: Ipv4Addr,
    /// Transfer port of the holding peer.
    pub port: u16,
}

impl SearchResponse {
    /// Decode the fixed 10-byte response frame.
    ///
    /// A well-formed frame cannot fail to decode; the all-zero frame is the
    /// "not found" sentinel, not an error.
    pub fn decode(frame: [u8; SEARCH_RESPONSE_BYTES]) -> Self {
        let peer_id = u32::from_be_bytes(frame[0..4].try_into().unwrap());
        let addr = Ipv4Addr::from(<[u8; 4]>::try_from(&frame[4..8]).unwrap());
        let port = u16::from_be_bytes(frame[8..10].try_into().unwrap());

        Self {
            peer_id,
            addr,
            port,
        }
    }

    /// Whether this is the all-zero "not found" sentinel.
    ///
    /// The registry also answers with the sentinel when the only holder is
    /// the querying peer itself.
    pub fn is_not_found(&self) -> bool {
        self.peer_id == 0 && self.addr.is_unspecified() && self.port == 0
    }

    /// Socket address of the holding peer.
    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.addr, self.port)
    }
}

impl fmt::Display for SearchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_not_found() {
            write!(f, "not found")
        } else {
            write!(f, "peer {} at {}:{}", self.peer_id, self.addr, self.port)
        }
    }
}
