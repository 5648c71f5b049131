use std::collections::HashSet;

use serde_json::Value;
use tracing::error;

use backend_domain::{DateRange, EventSummary, StoredEvent};

use crate::dtos::format_timestamp_ms;
use crate::AppError;
use crate::AppState;

/// Full scan of the store folded into summary statistics. Unbounded by
/// design; the dataset is expected to stay small.
pub async fn summarize_events(state: &AppState) -> Result<EventSummary, AppError> {
    let events = state.event_repo.scan_events().await.map_err(|err| {
        error!("failed to scan events: {}", err);
        state.metrics.record_store_error();
        AppError::Internal(err)
    })?;
    state.metrics.record_query();
    Ok(fold_summary(&events))
}

fn fold_summary(events: &[StoredEvent]) -> EventSummary {
    let mut summary = EventSummary::default();
    let mut sessions: HashSet<&str> = HashSet::new();
    let mut oldest_ms: Option<i64> = None;
    let mut newest_ms: Option<i64> = None;

    for event in events {
        summary.total_events += 1;
        *summary
            .event_types
            .entry(event.event_type.clone())
            .or_default() += 1;
        *summary.countries.entry(event.country.clone()).or_default() += 1;
        sessions.insert(&event.session_id);

        if event.event_type == "code_copy" {
            if let Some(version) = event.extra.get("codeVersion").and_then(scalar_key) {
                *summary.code_versions.entry(version).or_default() += 1;
            }
        }
        if event.event_type == "image_view" {
            if let Some(index) = event.extra.get("imageIndex").and_then(Value::as_i64) {
                *summary.image_views.entry(index).or_default() += 1;
            }
        }

        oldest_ms = Some(oldest_ms.map_or(event.timestamp_ms, |ms| ms.min(event.timestamp_ms)));
        newest_ms = Some(newest_ms.map_or(event.timestamp_ms, |ms| ms.max(event.timestamp_ms)));
    }

    summary.unique_sessions = sessions.len() as u64;
    summary.date_range = DateRange {
        oldest: oldest_ms.map(format_timestamp_ms),
        newest: newest_ms.map(format_timestamp_ms),
    };
    summary
}

fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
