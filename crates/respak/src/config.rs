//! Resolver configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use respak_archive::LengthPolicy;
use respak_common::ByteOrder;

/// Configuration for a [`ResourceResolver`](crate::ResourceResolver).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use respak::{LengthPolicy, ResolverConfig};
///
/// let config = ResolverConfig::new("resources.pak")
///     .with_length_policy(LengthPolicy::Strict)
///     .with_cache_capacity(64)
///     .with_scan_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.cache_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolverConfig {
    /// Path of the archive file.
    pub archive_path: PathBuf,

    /// Byte order the archive was written with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub byte_order: ByteOrder,

    /// Handling of decoded payloads whose length differs from the declared
    /// raw length.
    #[cfg_attr(feature = "serde", serde(default))]
    pub length_policy: LengthPolicy,

    /// Number of decoded resources to keep in memory. Zero disables caching.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cache_capacity: usize,

    /// Upper bound on the time one resolution may spend scanning.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scan_timeout: Option<Duration>,
}

impl ResolverConfig {
    /// Configuration with defaults for everything but the archive path.
    pub fn new<P: AsRef<Path>>(archive_path: P) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            byte_order: ByteOrder::default(),
            length_policy: LengthPolicy::default(),
            cache_capacity: 0,
            scan_timeout: None,
        }
    }

    /// Set the byte order.
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the length policy.
    pub fn with_length_policy(mut self, length_policy: LengthPolicy) -> Self {
        self.length_policy = length_policy;
        self
    }

    /// Set the cache capacity.
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Set the scan timeout.
    pub fn with_scan_timeout(mut self, scan_timeout: Duration) -> Self {
        self.scan_timeout = Some(scan_timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::new("a.pak");
        assert_eq!(config.archive_path, PathBuf::from("a.pak"));
        assert_eq!(config.byte_order, ByteOrder::Little);
        assert_eq!(config.length_policy, LengthPolicy::Warn);
        assert_eq!(config.cache_capacity, 0);
        assert!(config.scan_timeout.is_none());
    }
}
