//! Key and value types for the cross-cluster event cache.
//!
//! A cache entry is addressed by workflow identity plus the position of the
//! first replicated event (id and failover version). The value carries the
//! serialized event batch together with enough branch context to re-resolve
//! it against a version history on the receiving side.

use meridian_core::{BaseExecutionInfo, EventBlob, VersionHistoryItem, WorkflowKey};

use crate::cache::bounded::CacheWeight;

/// Identifies one replicated event batch within one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XdcCacheKey {
    /// Workflow the batch belongs to.
    pub workflow_key: WorkflowKey,
    /// First event id covered by the batch, inclusive.
    pub min_event_id: i64,
    /// Failover version of the batch's first event.
    pub version: i64,
}

impl XdcCacheKey {
    pub fn new(workflow_key: WorkflowKey, min_event_id: i64, version: i64) -> Self {
        Self {
            workflow_key,
            min_event_id,
            version,
        }
    }
}

/// A cached replication payload: serialized events plus branch context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdcCacheValue {
    /// Reset point for the branch the events extend, when the source knew one.
    pub base_workflow_info: Option<BaseExecutionInfo>,
    /// Version history items describing the branch the events belong to.
    pub version_history_items: Vec<VersionHistoryItem>,
    /// Serialized event batches, in order.
    pub event_blobs: Vec<EventBlob>,
    /// Event id one past the last event covered by the blobs, exclusive.
    pub next_event_id: i64,
}

impl XdcCacheValue {
    pub fn new(
        base_workflow_info: Option<BaseExecutionInfo>,
        version_history_items: Vec<VersionHistoryItem>,
        event_blobs: Vec<EventBlob>,
        next_event_id: i64,
    ) -> Self {
        Self {
            base_workflow_info,
            version_history_items,
            event_blobs,
            next_event_id,
        }
    }
}

impl CacheWeight for VersionHistoryItem {
    fn cache_weight(&self) -> usize {
        16 // event_id(8) + version(8)
    }
}

impl CacheWeight for EventBlob {
    fn cache_weight(&self) -> usize {
        self.data.len()
    }
}

impl CacheWeight for BaseExecutionInfo {
    fn cache_weight(&self) -> usize {
        self.run_id.len() + 16
    }
}

impl CacheWeight for XdcCacheValue {
    fn cache_weight(&self) -> usize {
        let base = self
            .base_workflow_info
            .as_ref()
            .map_or(0, CacheWeight::cache_weight);
        let items: usize = self
            .version_history_items
            .iter()
            .map(CacheWeight::cache_weight)
            .sum();
        let blobs: usize = self
            .event_blobs
            .iter()
            .map(CacheWeight::cache_weight)
            .sum();
        base + items + blobs
    }
}

// =============================================================================
// TESTS
// =============================================================================
