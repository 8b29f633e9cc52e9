//! History events and serialized event blobs.
//!
//! Replication ships workflow history as batches of events, serialized into
//! opaque blobs. The event model here is the slice of it replication needs:
//! identity (event id, version), ordering (event time), and kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// EVENT TYPES
// ============================================================================

/// Kind of a workflow history event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    WorkflowExecutionStarted,
    WorkflowExecutionCompleted,
    WorkflowExecutionFailed,
    WorkflowTaskScheduled,
    WorkflowTaskStarted,
    WorkflowTaskCompleted,
    ActivityTaskScheduled,
    ActivityTaskStarted,
    ActivityTaskCompleted,
    TimerStarted,
    TimerFired,
}

/// A single workflow history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Position of this event in the execution's history (1-based).
    pub event_id: i64,
    /// Failover version the event was written at.
    pub version: i64,
    /// Wall-clock time the event was recorded.
    pub event_time: DateTime<Utc>,
    /// Kind of event.
    pub event_type: EventType,
}

impl HistoryEvent {
    /// Create a new history event.
    pub fn new(
        event_id: i64,
        version: i64,
        event_time: DateTime<Utc>,
        event_type: EventType,
    ) -> Self {
        Self {
            event_id,
            version,
            event_time,
            event_type,
        }
    }
}

// ============================================================================
// EVENT BLOBS
// ============================================================================

/// Wire encoding of an event blob's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobEncoding {
    /// JSON-encoded event batch.
    Json,
}

impl fmt::Display for BlobEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobEncoding::Json => write!(f, "json"),
        }
    }
}

/// An opaque serialized batch of history events.
///
/// The payload is treated as bytes everywhere except the serializer; cache
/// and transport layers never look inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBlob {
    /// Encoding of the payload.
    pub encoding: BlobEncoding,
    /// Serialized event batch.
    pub data: Vec<u8>,
}

impl EventBlob {
    /// Create a blob from an encoding and payload.
    pub fn new(encoding: BlobEncoding, data: Vec<u8>) -> Self {
        Self { encoding, data }
    }
}

// =============================================================================
// TESTS
// =============================================================================
