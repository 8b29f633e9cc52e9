//! Meridian Replication - Cross-Cluster History Replication Support
//!
//! Receiver-side building blocks for cross-cluster (XDC) replication of
//! workflow histories: the replication event cache, branch resolution for
//! incoming event positions, event batch serialization, and the
//! flow-control surface the ingestion path consults.

pub mod cache;
pub mod flow_control;
pub mod locator;
pub mod serialization;

// Re-export the cache surface for ingestion-path callers
pub use cache::{
    BoundedCache, BoundedCacheOptions, CacheWeight, XdcCache, XdcCacheConfig, XdcCacheKey,
    XdcCacheStats, XdcCacheValue,
};

pub use flow_control::{
    FlowControlCommand, MockReceiverFlowController, ReceiverFlowController, TaskPriority,
};
pub use locator::{resolve_branch_for_item, ResolvedBranch};
pub use serialization::EventBatchSerializer;
