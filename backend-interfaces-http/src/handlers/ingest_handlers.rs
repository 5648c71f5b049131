use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::commands::ingest_commands;
use backend_application::dtos::IngestReceipt;
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{enforce_api_limit, enforce_ingest_limit};

#[derive(Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: IngestReceipt,
}

pub async fn record_event(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), HttpError> {
    enforce_api_limit(&state, client).await?;
    enforce_ingest_limit(&state, client).await?;

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|err| {
        error!("failed to parse ingest body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;

    let receipt = ingest_commands::record_event(&state, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            success: true,
            message: "event recorded",
            receipt,
        }),
    ))
}
