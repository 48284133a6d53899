use serde::{Deserialize, Serialize};

/// Attribute names of the timestamp table.
pub const RECORD_ID: &str = "recordId";
pub const TIMESTAMP: &str = "timestamp";

/// Derive the primary key of a record.
///
/// The trace id alone is not trusted to stay unique over time,
/// so the request timestamp is appended with its whitespace stripped.
pub fn derive_record_id(trace_id: &str, timestamp: &str) -> String {
    let compact: String = timestamp.split_whitespace().collect();

    format!("{}{}", trace_id, compact)
}

/// The key addressing a single record.
/// The timestamp is also the range key of the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub record_id: String,
    pub timestamp: String,
}

impl RecordKey {
    pub fn new(trace_id: &str, timestamp: &str) -> Self {
        RecordKey {
            record_id: derive_record_id(trace_id, timestamp),
            timestamp: timestamp.to_string(),
        }
    }
}

/// A timestamp persisted for one request.
/// Written once and never updated by the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampRecord {
    pub record_id: String,
    pub timestamp: String,
    pub client_ip: String,
    pub protocol: String,
}

impl TimestampRecord {
    pub fn new(key: RecordKey, client_ip: &str, protocol: &str) -> Self {
        TimestampRecord {
            record_id: key.record_id,
            timestamp: key.timestamp,
            client_ip: client_ip.to_string(),
            protocol: protocol.to_string(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            record_id: self.record_id.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}
