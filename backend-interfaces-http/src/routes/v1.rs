use axum::Router;

use backend_application::AppState;

use crate::error::HttpError;
use crate::handlers::{ingest_handlers, ops_handlers, query_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(ops_handlers::health))
        .route(
            "/metrics",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .route(
            "/api/v1/analytics",
            axum::routing::post(ingest_handlers::record_event),
        )
        .route(
            "/api/v1/analytics/stats",
            axum::routing::get(query_handlers::get_stats),
        )
        .route(
            "/api/v1/analytics/summary",
            axum::routing::get(query_handlers::get_summary),
        )
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> HttpError {
    HttpError::NotFound
}
