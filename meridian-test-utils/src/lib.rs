//! Meridian Test Utilities
//!
//! Centralized test infrastructure for the Meridian workspace:
//! - Fixtures for workflow identities, version histories, and event batches
//! - Proptest generators for history types
//! - A tracing capture layer for asserting on diagnostic log output

// Re-export core types for convenience
pub use meridian_core::{
    copy_base_execution_info, BaseExecutionInfo, BlobEncoding, EventBlob, EventType,
    HistoryError, HistoryEvent, MeridianError, MeridianResult, SerializationError,
    VersionHistories, VersionHistory, VersionHistoryItem, WorkflowExecutionInfo, WorkflowKey,
    FIRST_EVENT_ID,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Meridian history types.

    use super::*;
    use proptest::prelude::*;

    /// Generate an identifier component (lowercase, uuid-ish alphabet).
    pub fn arb_id_component() -> impl Strategy<Value = String> {
        "[a-z0-9-]{1,24}".prop_map(|s| s)
    }

    /// Generate a random WorkflowKey.
    pub fn arb_workflow_key() -> impl Strategy<Value = WorkflowKey> {
        (arb_id_component(), arb_id_component(), arb_id_component())
            .prop_map(|(namespace_id, workflow_id, run_id)| {
                WorkflowKey::new(namespace_id, workflow_id, run_id)
            })
    }

    /// Generate a VersionHistoryItem with a positive event id.
    pub fn arb_version_history_item() -> impl Strategy<Value = VersionHistoryItem> {
        (1i64..10_000, 0i64..100)
            .prop_map(|(event_id, version)| VersionHistoryItem::new(event_id, version))
    }

    /// Generate an event timestamp within a reasonable range (2020-2030).
    pub fn arb_event_time() -> impl Strategy<Value = chrono::DateTime<Utc>> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate an EventType variant.
    pub fn arb_event_type() -> impl Strategy<Value = EventType> {
        prop_oneof![
            Just(EventType::WorkflowExecutionStarted),
            Just(EventType::WorkflowExecutionCompleted),
            Just(EventType::WorkflowExecutionFailed),
            Just(EventType::WorkflowTaskScheduled),
            Just(EventType::WorkflowTaskStarted),
            Just(EventType::WorkflowTaskCompleted),
            Just(EventType::ActivityTaskScheduled),
            Just(EventType::ActivityTaskStarted),
            Just(EventType::ActivityTaskCompleted),
            Just(EventType::TimerStarted),
            Just(EventType::TimerFired),
        ]
    }

    /// Generate a HistoryEvent.
    pub fn arb_history_event() -> impl Strategy<Value = HistoryEvent> {
        (1i64..10_000, 0i64..100, arb_event_time(), arb_event_type()).prop_map(
            |(event_id, version, event_time, event_type)| {
                HistoryEvent::new(event_id, version, event_time, event_type)
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for replication cache scenarios.

    use super::*;

    /// Create a WorkflowKey with fresh namespace and run ids.
    pub fn make_workflow_key() -> WorkflowKey {
        WorkflowKey::new(
            Uuid::now_v7().to_string(),
            "test-workflow",
            Uuid::now_v7().to_string(),
        )
    }

    /// Build a VersionHistory from a branch token and (event_id, version)
    /// pairs.
    pub fn make_version_history(branch_token: &[u8], items: &[(i64, i64)]) -> VersionHistory {
        VersionHistory::new(
            branch_token.to_vec(),
            items
                .iter()
                .map(|(event_id, version)| VersionHistoryItem::new(*event_id, *version))
                .collect(),
        )
    }

    /// Build `count` consecutive HistoryEvents starting at `start_event_id`,
    /// all at `version`.
    pub fn make_event_batch(start_event_id: i64, count: i64, version: i64) -> Vec<HistoryEvent> {
        const EVENT_TYPE_CYCLE: [EventType; 4] = [
            EventType::WorkflowTaskScheduled,
            EventType::WorkflowTaskStarted,
            EventType::ActivityTaskScheduled,
            EventType::TimerStarted,
        ];
        (0..count)
            .map(|offset| {
                HistoryEvent::new(
                    start_event_id + offset,
                    version,
                    Utc::now(),
                    EVENT_TYPE_CYCLE[(offset % 4) as usize],
                )
            })
            .collect()
    }

    /// Create a BaseExecutionInfo pointing at a fresh run.
    pub fn make_base_execution_info(event_id: i64, version: i64) -> BaseExecutionInfo {
        BaseExecutionInfo::new(Uuid::now_v7().to_string(), event_id, version)
    }
}

// ============================================================================
// TRACING CAPTURE
// ============================================================================

pub mod capture {
    //! Capture tracing events for assertions.
    //!
    //! Diagnostics in Meridian are structured log events; tests assert on
    //! them by running the code under test inside [`LogCapture::scoped`],
    //! which installs a recording subscriber for the duration of the
    //! closure on the current thread.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// One recorded tracing event.
    #[derive(Debug, Clone)]
    pub struct CapturedEvent {
        pub level: Level,
        pub target: String,
        pub message: String,
        /// Non-message fields, rendered with their Debug representation.
        pub fields: HashMap<String, String>,
    }

    /// Records every tracing event emitted inside [`LogCapture::scoped`].
    #[derive(Clone, Default)]
    pub struct LogCapture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl LogCapture {
        pub fn new() -> Self {
            Self::default()
        }

        /// Run `f` with this capture installed as the thread-default
        /// subscriber. Events emitted on other threads are not recorded.
        pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
            let subscriber = tracing_subscriber::registry().with(CaptureLayer {
                events: Arc::clone(&self.events),
            });
            tracing::subscriber::with_default(subscriber, f)
        }

        /// All events captured so far, in emission order.
        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().unwrap().clone()
        }

        /// Number of captured events at `level`.
        pub fn count_at_level(&self, level: Level) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|event| event.level == level)
                .count()
        }

        /// Whether any captured message contains `needle`.
        pub fn contains_message(&self, needle: &str) -> bool {
            self.events
                .lock()
                .unwrap()
                .iter()
                .any(|event| event.message.contains(needle))
        }
    }

    struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message: visitor.message.unwrap_or_default(),
                fields: visitor.fields,
            });
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        message: Option<String>,
        fields: HashMap<String, String>,
    }

    impl FieldVisitor {
        fn record(&mut self, field: &Field, value: String) {
            if field.name() == "message" {
                self.message = Some(value);
            } else {
                self.fields.insert(field.name().to_string(), value);
            }
        }
    }

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.record(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.record(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.record(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.record(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.record(field, value.to_string());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
