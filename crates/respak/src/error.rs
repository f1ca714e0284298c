//! Error types for the resolver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`ResourceResolver`](crate::ResourceResolver).
#[derive(Debug, Error)]
pub enum Error {
    /// The archive file could not be inspected when building the resolver.
    #[error("archive {path} is unavailable: {source}")]
    ArchiveUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive path exists but is not a regular file.
    #[error("archive {0} is not a file")]
    NotAFile(PathBuf),

    /// Archive scanning or decoding error.
    #[error("{0}")]
    Archive(#[from] respak_archive::Error),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, Error>;
