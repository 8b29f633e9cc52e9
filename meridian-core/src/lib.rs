//! Meridian Core - History and Identity Types
//!
//! Pure domain types for multi-region workflow replication: workflow
//! identity, version-history branches, history events, and their intrinsic
//! operations. No I/O lives here - higher crates depend on this one.

pub mod error;
pub mod event;
pub mod history;
pub mod identity;

pub use error::{HistoryError, MeridianError, MeridianResult, SerializationError};
pub use event::{BlobEncoding, EventBlob, EventType, HistoryEvent};
pub use history::{
    copy_base_execution_info, BaseExecutionInfo, VersionHistories, VersionHistory,
    VersionHistoryItem, WorkflowExecutionInfo, FIRST_EVENT_ID,
};
pub use identity::WorkflowKey;
