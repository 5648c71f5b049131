use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub page_label: String,
    pub api_limit_requests: u32,
    pub api_limit_window_seconds: u64,
    pub ingest_limit_requests: u32,
    pub ingest_limit_window_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}

/// Conjunctive filters for the stats query. All supplied filters must
/// match; timestamp bounds are inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<String>,
    pub country: Option<String>,
    pub session_id: Option<String>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub limit: usize,
}

/// Row shape of the `analytics_events` table. `extra` is carried as a
/// JSON-serialized string column.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct EventRow {
    pub event_id: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    pub event_type: String,
    pub session_id: String,
    pub country: String,
    pub page: String,
    pub extra: String,
}
