use chrono::Utc;
use serde_json::Value;
use tracing::info;

use backend_domain::services::validate_event;
use backend_domain::NewEvent;

use crate::dtos::{format_timestamp_ms, IngestReceipt};
use crate::AppError;
use crate::AppState;

/// Validates one submission, stamps it server-side and persists it.
/// Exactly one event is created per successful call; duplicate payloads
/// produce duplicate events (no dedup at this layer).
pub async fn record_event(state: &AppState, payload: &Value) -> Result<IngestReceipt, AppError> {
    let draft = validate_event(payload).map_err(|err| {
        state.metrics.record_ingest_rejected();
        AppError::BadRequest(err.to_string())
    })?;

    let timestamp_ms = Utc::now().timestamp_millis();
    let event = NewEvent::from_draft(draft, state.config.page_label.clone(), timestamp_ms);
    let event_type = event.event_type;

    let event_id = state.event_repo.insert_event(&event).await.map_err(|err| {
        state.metrics.record_store_error();
        AppError::Internal(err)
    })?;

    info!(
        event_id = %event_id,
        event_type = event_type.as_str(),
        "event recorded"
    );
    state.metrics.record_ingest();

    Ok(IngestReceipt {
        event_id,
        event_type: event_type.as_str().to_string(),
        timestamp: format_timestamp_ms(timestamp_ms),
    })
}
