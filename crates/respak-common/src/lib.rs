//! Common utilities for respak.
//!
//! This crate provides the foundational pieces shared by the archive reader
//! and the resolver:
//!
//! - [`BinaryStreamReader`] - Sequential, seekable reading of archive fields
//! - [`ByteOrder`] - The integer byte order an archive was written with
//! - [`hash`] - Lookup strings, hashed identifiers and key/nonce derivation

mod error;
mod stream;

pub mod hash;

pub use error::{Error, Result};
pub use stream::{BinaryStreamReader, ByteOrder};
