use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary statistics produced by a full scan of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub total_events: u64,
    pub event_types: BTreeMap<String, u64>,
    pub countries: BTreeMap<String, u64>,
    pub unique_sessions: u64,
    pub code_versions: BTreeMap<String, u64>,
    pub image_views: BTreeMap<i64, u64>,
    pub date_range: DateRange,
}

/// Oldest and newest event timestamps seen during the scan, RFC 3339.
/// Both are null when the store holds zero events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub oldest: Option<String>,
    pub newest: Option<String>,
}
