//! Error types for Meridian operations

use thiserror::Error;

/// Version-history errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No version-history branch contains event {event_id} at version {version}")]
    BranchNotFound { event_id: i64, version: i64 },

    #[error("Version-history index {index} is out of range, branch count: {count}")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Version history is empty")]
    EmptyHistory,

    #[error("Malformed version history: {reason}")]
    MalformedHistory { reason: String },
}

/// Event-blob serialization errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Failed to encode events as {encoding}: {reason}")]
    EncodeFailed { encoding: String, reason: String },

    #[error("Failed to decode event blob as {encoding}: {reason}")]
    DecodeFailed { encoding: String, reason: String },
}

/// Master error type for all Meridian errors.
#[derive(Debug, Clone, Error)]
pub enum MeridianError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}

/// Result type alias for Meridian operations.
pub type MeridianResult<T> = Result<T, MeridianError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_error_display_branch_not_found() {
        let err = HistoryError::BranchNotFound {
            event_id: 42,
            version: 7,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("No version-history branch"));
        assert!(msg.contains("42"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn test_history_error_display_index_out_of_range() {
        let err = HistoryError::IndexOutOfRange { index: 3, count: 2 };
        let msg = format!("{}", err);
        assert!(msg.contains("out of range"));
        assert!(msg.contains("3"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn test_history_error_display_empty_history() {
        let err = HistoryError::EmptyHistory;
        let msg = format!("{}", err);
        assert!(msg.contains("empty"));
    }

    #[test]
    fn test_history_error_display_malformed() {
        let err = HistoryError::MalformedHistory {
            reason: "no joint point found".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Malformed version history"));
        assert!(msg.contains("no joint point found"));
    }

    #[test]
    fn test_serialization_error_display_decode_failed() {
        let err = SerializationError::DecodeFailed {
            encoding: "json".to_string(),
            reason: "unexpected end of input".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Failed to decode"));
        assert!(msg.contains("json"));
        assert!(msg.contains("unexpected end of input"));
    }

    #[test]
    fn test_meridian_error_from_variants() {
        let history = MeridianError::from(HistoryError::EmptyHistory);
        assert!(matches!(history, MeridianError::History(_)));

        let serialization = MeridianError::from(SerializationError::EncodeFailed {
            encoding: "json".to_string(),
            reason: "bad".to_string(),
        });
        assert!(matches!(serialization, MeridianError::Serialization(_)));
    }
}
