//! In-memory cache of decoded resources.
//!
//! Archives are immutable at runtime, so a decoded resource stays valid for
//! the lifetime of the resolver. Entries are keyed by lookup string, which
//! fully determines the result of a resolution.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::ResolvedResource;

/// Least-recently-used cache shared by all callers of one resolver.
pub struct ResourceCache {
    entries: Mutex<LruCache<String, ResolvedResource>>,
}

impl ResourceCache {
    /// Create a cache holding at most `capacity` resources.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get a copy of a cached resource.
    pub fn get(&self, lookup: &str) -> Option<ResolvedResource> {
        self.entries.lock().get(lookup).cloned()
    }

    /// Remember a resource.
    pub fn insert(&self, lookup: String, resource: ResolvedResource) {
        self.entries.lock().put(lookup, resource);
    }

    /// Number of cached resources.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached resource.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("ResourceCache")
            .field("len", &entries.len())
            .field("capacity", &entries.cap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use respak_archive::Recipe;

    fn resource(id: &str) -> ResolvedResource {
        ResolvedResource::new(id, "text/plain", Recipe::None, id.as_bytes())
    }

    #[test]
    fn test_get_returns_copy() {
        let cache = ResourceCache::new(NonZeroUsize::new(2).unwrap());
        cache.insert("wwwa".to_string(), resource("wwwa"));

        assert_eq!(cache.get("wwwa").unwrap().data(), b"wwwa");
        assert!(cache.get("wwwb").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = ResourceCache::new(NonZeroUsize::new(2).unwrap());
        cache.insert("a".to_string(), resource("a"));
        cache.insert("b".to_string(), resource("b"));
        cache.get("a");
        cache.insert("c".to_string(), resource("c"));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_clear() {
        let cache = ResourceCache::new(NonZeroUsize::new(4).unwrap());
        cache.insert("a".to_string(), resource("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
