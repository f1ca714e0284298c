//! Reader for embedded resource archives.
//!
//! An archive is a single file of sequential, variable-length records with
//! no index. Each record carries an identifier, a recipe tag naming the
//! transforms applied to its payload, a content type and the payload. It
//! supports:
//!
//! - Plain records identified by `namespace + logical_path`
//! - Secure records identified by the hex SHA-512 of that string
//! - AES-128-CTR encryption keyed per resource (recipes `MSC`, `MSCZ`)
//! - Raw DEFLATE compression (recipes `Z`, `MSCZ`)
//! - Skipping non-matching records by seeking, without reading payloads
//!
//! # Example
//!
//! ```no_run
//! use respak_archive::{ArchiveScanner, Lookup, ScanOptions};
//!
//! let mut scanner = ArchiveScanner::open("resources.pak", ScanOptions::default())?;
//!
//! if let Some(record) = scanner.scan(&Lookup::secure("www", "index.html"))? {
//!     println!("{}: {} bytes", record.content_type(), record.data().len());
//! }
//! # Ok::<(), respak_archive::Error>(())
//! ```

mod error;
mod recipe;
mod record;
mod scanner;

pub mod codec;
pub mod crypto;
pub mod decompress;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use codec::{LengthPolicy, Lookup};
pub use error::{Error, Result};
pub use recipe::Recipe;
pub use record::{ArchiveRecord, RecordHeader};
pub use scanner::{ArchiveScanner, Headers, ScanOptions};
