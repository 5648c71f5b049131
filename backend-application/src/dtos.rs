// Wire-facing DTOs shared by the HTTP handlers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use backend_domain::StoredEvent;

/// Acknowledgment returned for one accepted ingestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: String,
}

/// One stored event as the stats endpoint returns it, with the timestamp
/// resolved to RFC 3339 instead of the store-native representation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub session_id: String,
    pub country: String,
    pub page: String,
    pub extra: Map<String, Value>,
    pub timestamp: String,
}

impl From<StoredEvent> for EventRecord {
    fn from(event: StoredEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type,
            session_id: event.session_id,
            country: event.country,
            page: event.page,
            extra: event.extra,
            timestamp: format_timestamp_ms(event.timestamp_ms),
        }
    }
}

/// Query parameters accepted by the stats endpoint. Serialized back on
/// the response as the `filters` echo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub country: Option<String>,
    pub session_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

pub fn format_timestamp_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
