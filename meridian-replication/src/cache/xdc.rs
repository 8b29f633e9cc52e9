//! Cross-cluster (XDC) replication event cache.
//!
//! Passive-side cache for replicated event batches that arrived ahead of
//! their prerequisites. Batches are kept briefly, keyed by workflow and
//! first-event position, until history catches up enough to apply them.
//!
//! The cache is an overwrite cache, not a consistency layer: a second write
//! to a live key always wins. A repeat write whose `next_event_id` disagrees
//! with the stored entry means the source re-sent a batch with different
//! contents, which a healthy source never does - the cache records the
//! anomaly and logs both payloads before overwriting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use meridian_core::{EventBlob, HistoryEvent};

use crate::cache::bounded::{BoundedCache, BoundedCacheOptions};
use crate::cache::key::{XdcCacheKey, XdcCacheValue};
use crate::serialization::EventBatchSerializer;

/// Smallest byte budget the cache will run with; smaller configured
/// budgets are raised to it.
const XDC_MIN_CACHE_BYTES: u64 = 64 * 1024; // 64KB

/// Configuration for [`XdcCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XdcCacheConfig {
    /// Byte budget for cached values. Raised to the internal floor when
    /// configured smaller.
    pub max_bytes: u64,
    /// Entries expire this long after their most recent write.
    pub ttl: Duration,
}

impl Default for XdcCacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 8 * 1024 * 1024,
            ttl: Duration::from_secs(30),
        }
    }
}

impl XdcCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Snapshot of cache access counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XdcCacheStats {
    /// Lookups that found a live entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Overwrites of a live key with a mismatched `next_event_id`.
    pub anomalies: u64,
}

impl XdcCacheStats {
    /// Fraction of lookups that hit, 0.0 when no lookups have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Byte-bounded, TTL-bounded cache for replicated event batches.
pub struct XdcCache {
    cache: BoundedCache<XdcCacheKey, XdcCacheValue>,
    serializer: EventBatchSerializer,
    hits: AtomicU64,
    misses: AtomicU64,
    anomalies: AtomicU64,
}

impl XdcCache {
    /// Create a cache from `config`, raising the byte budget to the
    /// internal floor if configured below it.
    pub fn new(config: XdcCacheConfig) -> Self {
        let max_bytes = config.max_bytes.max(XDC_MIN_CACHE_BYTES);
        let options = BoundedCacheOptions {
            ttl: Some(config.ttl),
        };
        Self {
            cache: BoundedCache::new(max_bytes, options),
            serializer: EventBatchSerializer::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            anomalies: AtomicU64::new(0),
        }
    }

    /// Create a cache with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(XdcCacheConfig::default())
    }

    /// Insert or overwrite the value for `key`.
    ///
    /// Never fails and always lands: the write replaces whatever was stored
    /// and restarts the entry's TTL. If the key is live with a different
    /// `next_event_id`, the overwrite is counted as an anomaly and both
    /// payloads are logged decoded. The read-then-write is not atomic, so
    /// under racing writers the diagnostics are advisory; last write wins
    /// either way.
    pub fn put(&self, key: XdcCacheKey, value: XdcCacheValue) {
        // Diagnostic read; deliberately not counted as a hit or miss.
        if let Some(existing) = self.cache.get(&key) {
            if existing.next_event_id != value.next_event_id {
                self.anomalies.fetch_add(1, Ordering::Relaxed);
                self.log_duplicate_key(&key, &existing, &value);
            }
        }
        self.cache.put(key, value);
    }

    /// Clone out the value for `key`, if present and unexpired.
    pub fn get(&self, key: &XdcCacheKey) -> Option<XdcCacheValue> {
        match self.cache.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Snapshot the access counters.
    pub fn stats(&self) -> XdcCacheStats {
        XdcCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
        }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run deferred cache housekeeping now. See
    /// [`BoundedCache::run_pending_tasks`].
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }

    fn log_duplicate_key(&self, key: &XdcCacheKey, existing: &XdcCacheValue, new: &XdcCacheValue) {
        let existing_events = self.decode_blobs_for_diagnostics(&existing.event_blobs);
        let new_events = self.decode_blobs_for_diagnostics(&new.event_blobs);
        tracing::error!(
            workflow_key = %key.workflow_key,
            min_event_id = key.min_event_id,
            version = key.version,
            existing_next_event_id = existing.next_event_id,
            new_next_event_id = new.next_event_id,
            existing_events = ?existing_events,
            new_events = ?new_events,
            "Putting duplicate key in XDC cache with mismatched next event id"
        );
    }

    /// Decode every blob in a payload for logging. Any undecodable blob
    /// voids the whole side: the failure is logged and `None` stands in so
    /// the anomaly log still fires with whatever context is available.
    fn decode_blobs_for_diagnostics(&self, blobs: &[EventBlob]) -> Option<Vec<Vec<HistoryEvent>>> {
        let mut batches = Vec::with_capacity(blobs.len());
        for blob in blobs {
            match self.serializer.deserialize_events(blob) {
                Ok(events) => batches.push(events),
                Err(error) => {
                    tracing::error!(%error, "Error deserializing events for XDC cache diagnostics");
                    return None;
                }
            }
        }
        Some(batches)
    }
}

// =============================================================================
// TESTS
// =============================================================================
