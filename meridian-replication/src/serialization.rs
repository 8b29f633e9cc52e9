//! Event batch serialization.
//!
//! Replication carries event batches as opaque blobs so the cache and the
//! wire never depend on the event schema. [`EventBatchSerializer`] is the
//! single place batches are encoded and decoded.

use meridian_core::{
    BlobEncoding, EventBlob, HistoryEvent, MeridianResult, SerializationError,
};

/// Encodes and decodes history event batches to and from [`EventBlob`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBatchSerializer;

impl EventBatchSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a batch of events into a single blob.
    pub fn serialize_events(&self, events: &[HistoryEvent]) -> MeridianResult<EventBlob> {
        let data = serde_json::to_vec(events).map_err(|e| SerializationError::EncodeFailed {
            encoding: BlobEncoding::Json.to_string(),
            reason: e.to_string(),
        })?;
        Ok(EventBlob::new(BlobEncoding::Json, data))
    }

    /// Deserialize a blob back into its event batch.
    pub fn deserialize_events(&self, blob: &EventBlob) -> MeridianResult<Vec<HistoryEvent>> {
        match blob.encoding {
            BlobEncoding::Json => {
                let events = serde_json::from_slice(&blob.data).map_err(|e| {
                    SerializationError::DecodeFailed {
                        encoding: blob.encoding.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(events)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use meridian_core::{EventType, MeridianError};

    fn make_events(start_event_id: i64, count: i64, version: i64) -> Vec<HistoryEvent> {
        (start_event_id..start_event_id + count)
            .map(|event_id| {
                HistoryEvent::new(event_id, version, Utc::now(), EventType::TimerFired)
            })
            .collect()
    }

    #[test]
    fn test_serialize_then_deserialize_preserves_batch() {
        let serializer = EventBatchSerializer::new();
        let events = make_events(5, 3, 2);

        let blob = serializer
            .serialize_events(&events)
            .expect("serialization should succeed");
        assert_eq!(blob.encoding, BlobEncoding::Json);

        let decoded = serializer
            .deserialize_events(&blob)
            .expect("deserialization should succeed");
        assert_eq!(decoded, events);
    }

    #[test]
    fn test_empty_batch_roundtrips() {
        let serializer = EventBatchSerializer::new();
        let blob = serializer
            .serialize_events(&[])
            .expect("serialization should succeed");

        let decoded = serializer
            .deserialize_events(&blob)
            .expect("deserialization should succeed");
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_garbage_blob_fails_to_decode() {
        let serializer = EventBatchSerializer::new();
        let blob = EventBlob::new(BlobEncoding::Json, b"not json at all".to_vec());

        let err = serializer
            .deserialize_events(&blob)
            .expect_err("garbage should not decode");
        assert!(matches!(
            err,
            MeridianError::Serialization(SerializationError::DecodeFailed { .. })
        ));
    }
}
