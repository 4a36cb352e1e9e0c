//! Protocol error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// A filename cannot be carried on the wire.
    #[error("invalid filename {name:?}: {reason}")]
    InvalidFilename {
        name: String,
        reason: &'static str,
    },

    /// The catalog would not fit in a single PUBLISH request.
    #[error("catalog exceeds PUBLISH limits: {files} files, {bytes} bytes")]
    CatalogOverflow { files: usize, bytes: usize },
}

/// Errors from building a shared-file catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An entry violated a wire-format limit.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The shared directory could not be opened or read.
    #[error("shared directory {path:?} unavailable: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
