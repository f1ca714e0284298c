//! Error types for respak-common.

use thiserror::Error;

/// Common error type for stream-level operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of stream reached while reading or skipping.
    #[error("unexpected end of stream: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: u64, available: u64 },

    /// A length prefix decoded to a negative value.
    #[error("negative length prefix: {0}")]
    NegativeLength(i64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Whether this error means the underlying stream itself failed or ended
    /// early, as opposed to a well-formed stream carrying bad content.
    pub fn is_stream_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::UnexpectedEof { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
