//! Error types for the archive crate.

use thiserror::Error;

/// Errors that can occur while scanning or decoding an archive.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error opening the archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream-level error (read, seek, truncation, bad UTF-8).
    #[error("{0}")]
    Common(#[from] respak_common::Error),

    /// Recipe tag the reader does not know how to undo on a secure record.
    #[error("unsupported recipe {recipe:?} on record {identifier}")]
    UnsupportedRecipe { identifier: String, recipe: String },

    /// Key or nonce of the wrong size for the cipher.
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidKeyMaterial {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Payload failed to decompress or decoded to the wrong length.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// Record fields that contradict each other.
    #[error("corrupt record {identifier}: {reason}")]
    CorruptRecord { identifier: String, reason: String },

    /// The scan ran past its deadline.
    #[error("scan deadline exceeded after {records} records")]
    DeadlineExceeded { records: u64 },
}

impl Error {
    /// Whether this error came from the archive stream itself.
    ///
    /// Stream failures abort a whole resolution; every other error only
    /// aborts the lookup attempt that hit it.
    pub fn is_stream_failure(&self) -> bool {
        match self {
            Error::Io(_) | Error::DeadlineExceeded { .. } => true,
            Error::Common(e) => e.is_stream_failure(),
            _ => false,
        }
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_failure_classification() {
        let eof = Error::Common(respak_common::Error::UnexpectedEof {
            needed: 4,
            available: 0,
        });
        assert!(eof.is_stream_failure());
        assert!(Error::DeadlineExceeded { records: 3 }.is_stream_failure());

        let recipe = Error::UnsupportedRecipe {
            identifier: "abc".into(),
            recipe: "BOGUS".into(),
        };
        assert!(!recipe.is_stream_failure());
        assert!(!Error::CorruptPayload("bad".into()).is_stream_failure());
    }
}
