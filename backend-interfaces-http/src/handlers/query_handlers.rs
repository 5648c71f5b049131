use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::Json;
use serde::Serialize;

use backend_application::dtos::{EventRecord, StatsQuery};
use backend_application::queries::{stats_queries, summary_queries};
use backend_application::AppState;
use backend_domain::EventSummary;

use crate::error::HttpError;
use crate::middleware::enforce_api_limit;

#[derive(Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub count: usize,
    pub events: Vec<EventRecord>,
    pub filters: StatsQuery,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: EventSummary,
}

pub async fn get_stats(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, HttpError> {
    enforce_api_limit(&state, client).await?;
    let events = stats_queries::list_events(&state, query.clone()).await?;
    Ok(Json(StatsResponse {
        success: true,
        count: events.len(),
        events,
        filters: query,
    }))
}

pub async fn get_summary(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
) -> Result<Json<SummaryResponse>, HttpError> {
    enforce_api_limit(&state, client).await?;
    let summary = summary_queries::summarize_events(&state).await?;
    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}
