use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub store: &'static str,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    match timeout(
        Duration::from_secs(timeout_secs),
        state.event_repo.ping(),
    )
    .await
    {
        Ok(Ok(_)) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                store: "reachable",
            }),
        ),
        Ok(Err(err)) => {
            error!("store ping failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "degraded",
                    store: "unreachable",
                }),
            )
        }
        Err(_) => {
            error!("store ping timeout after {}s", timeout_secs);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "degraded",
                    store: "timeout",
                }),
            )
        }
    }
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload)
}
