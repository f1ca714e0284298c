//! Resource resolution by logical path.
//!
//! A resolution makes up to two attempts against the archive. The secure
//! attempt looks for the hashed identifier of `namespace + logical_path`;
//! the plain attempt looks for that string itself. The first attempt that
//! yields a record wins.
//!
//! A decode error only ends the attempt that hit it, and resolution falls
//! through to the next one. A failure of the archive stream itself (open,
//! read, seek, truncation, deadline) ends the whole resolution.

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;

use respak_archive::{ArchiveRecord, ArchiveScanner, Lookup, RecordHeader, ScanOptions};
use respak_common::hash;
use tracing::{debug, error};

use crate::cache::ResourceCache;
use crate::config::ResolverConfig;
use crate::resource::ResolvedResource;
use crate::{Error, Result};

/// Namespace of bundled web content.
pub const WEB_NAMESPACE: &str = "www";

/// Namespace of bundled configuration files.
pub const CONFIG_NAMESPACE: &str = "config/";

/// Resolves resources from one archive.
///
/// Build one at startup and share it by reference. Each resolution opens
/// its own handle on the archive, so concurrent calls from different threads
/// do not share stream state.
///
/// # Example
///
/// ```no_run
/// use respak::ResourceResolver;
///
/// let resolver = ResourceResolver::open("resources.pak")?;
///
/// if let Some(page) = resolver.retrieve_web_resource("index.html") {
///     println!("{}: {} bytes", page.content_type(), page.data().len());
/// }
/// # Ok::<(), respak::Error>(())
/// ```
#[derive(Debug)]
pub struct ResourceResolver {
    config: ResolverConfig,
    cache: Option<ResourceCache>,
}

impl ResourceResolver {
    /// Create a resolver, checking that the archive file exists.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        let metadata =
            std::fs::metadata(&config.archive_path).map_err(|source| Error::ArchiveUnavailable {
                path: config.archive_path.clone(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(config.archive_path.clone()));
        }

        let cache = NonZeroUsize::new(config.cache_capacity).map(ResourceCache::new);

        debug!(
            archive = %config.archive_path.display(),
            byte_order = %config.byte_order,
            cache_capacity = config.cache_capacity,
            "resource resolver ready"
        );

        Ok(Self { config, cache })
    }

    /// Create a resolver with default settings.
    pub fn open<P: AsRef<Path>>(archive_path: P) -> Result<Self> {
        Self::new(ResolverConfig::new(archive_path))
    }

    /// The resolver's configuration.
    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Path of the archive.
    #[inline]
    pub fn archive_path(&self) -> &Path {
        &self.config.archive_path
    }

    /// The resource cache, when enabled.
    #[inline]
    pub fn cache(&self) -> Option<&ResourceCache> {
        self.cache.as_ref()
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            byte_order: self.config.byte_order,
            length_policy: self.config.length_policy,
            // A timeout too large to represent means no deadline.
            deadline: self
                .config
                .scan_timeout
                .and_then(|timeout| Instant::now().checked_add(timeout)),
        }
    }

    fn attempt(
        &self,
        lookup: &Lookup,
        options: ScanOptions,
    ) -> respak_archive::Result<Option<ArchiveRecord>> {
        let mut scanner = ArchiveScanner::open(&self.config.archive_path, options)?;
        scanner.scan(lookup)
    }

    /// Resolve `namespace + logical_path`, trying the secure identifier first
    /// and the plain identifier second.
    ///
    /// Returns `Ok(None)` when neither attempt finds a usable record.
    pub fn resolve(&self, logical_path: &str, namespace: &str) -> Result<Option<ResolvedResource>> {
        let lookup_string = hash::lookup_string(namespace, logical_path);

        if let Some(resource) = self.cache.as_ref().and_then(|c| c.get(&lookup_string)) {
            debug!(lookup = %lookup_string, "cache hit");
            return Ok(Some(resource));
        }

        let options = self.scan_options();
        let attempts = [
            Lookup::secure(namespace, logical_path),
            Lookup::plain(namespace, logical_path),
        ];

        for lookup in &attempts {
            match self.attempt(lookup, options) {
                Ok(Some(record)) => {
                    let resource = ResolvedResource::from(record);
                    if let Some(cache) = &self.cache {
                        cache.insert(lookup_string, resource.clone());
                    }
                    return Ok(Some(resource));
                }
                Ok(None) => {}
                Err(e) if e.is_stream_failure() => return Err(e.into()),
                Err(e) => {
                    error!(
                        lookup = %lookup_string,
                        secure = lookup.is_secure(),
                        error = %e,
                        "lookup attempt failed"
                    );
                }
            }
        }

        debug!(lookup = %lookup_string, "resource not found");
        Ok(None)
    }

    fn retrieve(&self, id: &str, namespace: &str) -> Option<ResolvedResource> {
        match self.resolve(id, namespace) {
            Ok(resource) => resource,
            Err(e) => {
                error!(
                    namespace,
                    id,
                    error = %e,
                    "resource resolution failed"
                );
                None
            }
        }
    }

    /// Resolve a web resource. Errors are logged and reported as not found.
    pub fn retrieve_web_resource(&self, id: &str) -> Option<ResolvedResource> {
        self.retrieve(id, WEB_NAMESPACE)
    }

    /// Resolve a config resource. Errors are logged and reported as not found.
    pub fn retrieve_config_resource(&self, id: &str) -> Option<ResolvedResource> {
        self.retrieve(id, CONFIG_NAMESPACE)
    }

    /// Web resource as `(bytes, content type, found)`.
    pub fn get_web_resource(&self, path: &str) -> (Vec<u8>, String, bool) {
        found_triple(self.retrieve_web_resource(path))
    }

    /// Config resource as `(bytes, content type, found)`.
    pub fn get_config_resource(&self, path: &str) -> (Vec<u8>, String, bool) {
        found_triple(self.retrieve_config_resource(path))
    }

    /// Read every record header in the archive.
    pub fn list(&self) -> Result<Vec<RecordHeader>> {
        let mut scanner = ArchiveScanner::open(&self.config.archive_path, self.scan_options())?;
        let headers = scanner.headers().collect::<respak_archive::Result<Vec<_>>>()?;
        Ok(headers)
    }
}

fn found_triple(resource: Option<ResolvedResource>) -> (Vec<u8>, String, bool) {
    match resource {
        Some(resource) => {
            let (data, content_type) = resource.into_parts();
            (data, content_type, true)
        }
        None => (Vec::new(), String::new(), false),
    }
}
