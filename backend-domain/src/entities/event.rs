// Event entity
// Represents one immutable analytics record describing a user interaction

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::EventType;

/// A submission that passed validation but has not been stamped yet.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub event_type: EventType,
    pub session_id: String,
    pub country: String,
    pub extra: Map<String, Value>,
}

/// A draft plus the server-side stamps, ready for persistence.
/// `timestamp_ms` is assigned at ingestion time and never client-supplied.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: EventType,
    pub session_id: String,
    pub country: String,
    pub page: String,
    pub timestamp_ms: i64,
    pub extra: Map<String, Value>,
}

impl NewEvent {
    pub fn from_draft(draft: EventDraft, page: String, timestamp_ms: i64) -> Self {
        Self {
            event_type: draft.event_type,
            session_id: draft.session_id,
            country: draft.country,
            page,
            timestamp_ms,
            extra: draft.extra,
        }
    }
}

/// A persisted event as read back from the store. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    pub timestamp_ms: i64,
    pub event_type: String,
    pub session_id: String,
    pub country: String,
    pub page: String,
    pub extra: Map<String, Value>,
}
