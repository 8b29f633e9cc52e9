//! Byte-weighed, TTL-bounded cache container.
//!
//! A thin typed wrapper over `moka::sync::Cache`. The wrapper pins down the
//! contract the replication cache relies on: entries are charged by byte
//! weight rather than count, expiry is measured from the most recent write,
//! and nothing is ever pinned - a value handed out by `get` is a clone and
//! the original stays evictable.

use std::hash::Hash;
use std::time::Duration;

use moka::sync::Cache;

/// Capability to report an approximate in-memory cost in bytes.
pub trait CacheWeight {
    /// Approximate cost of this value in bytes.
    fn cache_weight(&self) -> usize;
}

/// Options for constructing a [`BoundedCache`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedCacheOptions {
    /// Entries expire this long after their most recent write. `None`
    /// disables expiry.
    pub ttl: Option<Duration>,
}

/// A concurrent key/value container bounded by a byte budget.
///
/// Values report their cost via [`CacheWeight`]. Overwriting a key replaces
/// the stored value and restarts its TTL clock. An entry heavier than the
/// whole budget is never retained.
pub struct BoundedCache<K, V> {
    inner: Cache<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: CacheWeight + Clone + Send + Sync + 'static,
{
    /// Create a container with the given byte budget.
    pub fn new(max_bytes: u64, options: BoundedCacheOptions) -> Self {
        let mut builder = Cache::builder()
            .weigher(|_key: &K, value: &V| value.cache_weight().min(u32::MAX as usize) as u32)
            .max_capacity(max_bytes);
        if let Some(ttl) = options.ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            inner: builder.build(),
        }
    }

    /// Insert or overwrite the value for `key`.
    pub fn put(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Clone out the value for `key`, if present and unexpired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Approximate total weight currently charged against the budget.
    pub fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    /// Run deferred housekeeping (eviction and expiry bookkeeping) now.
    ///
    /// The engine defers maintenance for throughput; tests call this to
    /// observe eviction deterministically.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

// =============================================================================
// TESTS
// =============================================================================
