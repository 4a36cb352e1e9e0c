//! Protocol engine for the Shoal file-sharing registry.
//!
//! This crate implements the peer side of the registry wire protocol:
//!
//! - Binary encoding of JOIN/PUBLISH/SEARCH/FETCH requests and decoding of
//!   the fixed-size SEARCH response
//! - The shared-file catalog, a bounded snapshot of the local shared
//!   directory eligible for a single PUBLISH request
//!
//! It performs no network I/O; sending and receiving bytes is the job of
//! the `shoal-peer` crate.

pub mod catalog;
pub mod error;
pub mod wire;

// Re-export main types
pub use catalog::{FileCatalog, FileEntry};
pub use error::{CatalogError, WireError};
pub use wire::{
    Action, SearchResponse, MAX_CATALOG_FILES, MAX_NAME_WIRE_BYTES, MAX_PUBLISH_BYTES,
    PUBLISH_HEADER_BYTES, SEARCH_RESPONSE_BYTES,
};
