//! Turn store port
//!
//! Fire-and-forget persistence of processed turns. A failing store must
//! never fail the turn; implementations log and swallow their own errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted record, serialized as a single JSON line by file-backed
/// implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl TurnRecord {
    pub fn new(record_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            record_type: record_type.into(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Port for persisting turn records
pub trait TurnStore: Send + Sync {
    fn record(&self, record: TurnRecord);
}

/// No-op store for tests and callers that do not persist
pub struct NoTurnStore;

impl TurnStore for NoTurnStore {
    fn record(&self, _record: TurnRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_type_field() {
        let record = TurnRecord::new("turn_completed", serde_json::json!({"answer": "x"}));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "turn_completed");
        assert!(json.get("timestamp").is_some());
        assert_eq!(json["payload"]["answer"], "x");
    }
}
