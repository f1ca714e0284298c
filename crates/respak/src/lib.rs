//! respak - resolve bundled resources from an embedded resource archive.
//!
//! This crate is the entry point for applications. It wraps the archive
//! reader in a [`ResourceResolver`] that looks resources up by namespace and
//! logical path.
//!
//! # Crates
//!
//! - [`respak_common`] - Stream reading, identifier hashing
//! - [`respak_archive`] - Record format, decryption, decompression, scanning
//!
//! # Example
//!
//! ```no_run
//! use respak::prelude::*;
//!
//! let config = ResolverConfig::new("resources.pak").with_cache_capacity(128);
//! let resolver = ResourceResolver::new(config)?;
//!
//! let (bytes, content_type, found) = resolver.get_config_resource("io-config.xml");
//! if found {
//!     println!("{content_type}: {} bytes", bytes.len());
//! }
//! # Ok::<(), respak::Error>(())
//! ```

mod cache;
mod config;
mod error;
mod resolver;
mod resource;

// Re-export the sub-crates
pub use respak_archive as archive;
pub use respak_common as common;

pub use cache::ResourceCache;
pub use config::ResolverConfig;
pub use error::{Error, Result};
pub use resolver::{ResourceResolver, CONFIG_NAMESPACE, WEB_NAMESPACE};
pub use resource::ResolvedResource;

pub use respak_archive::{LengthPolicy, Recipe, RecordHeader};
pub use respak_common::ByteOrder;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ByteOrder, LengthPolicy, Recipe, ResolvedResource, ResolverConfig, ResourceResolver,
        CONFIG_NAMESPACE, WEB_NAMESPACE,
    };
    pub use respak_archive::{ArchiveScanner, Lookup, RecordHeader, ScanOptions};
    pub use respak_common::hash;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
