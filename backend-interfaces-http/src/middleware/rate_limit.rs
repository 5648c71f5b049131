use std::net::SocketAddr;

use tracing::warn;

use backend_application::rate_limit::FixedWindowLimiter;
use backend_application::AppState;

use crate::error::HttpError;

/// General window shared by every `/api/v1` route.
pub async fn enforce_api_limit(state: &AppState, client: SocketAddr) -> Result<(), HttpError> {
    enforce(state, &state.rate_limits.api, client, "api").await
}

/// Tighter per-client window applied to ingestion on top of the general
/// one.
pub async fn enforce_ingest_limit(state: &AppState, client: SocketAddr) -> Result<(), HttpError> {
    enforce(state, &state.rate_limits.ingest, client, "ingest").await
}

async fn enforce(
    state: &AppState,
    limiter: &FixedWindowLimiter,
    client: SocketAddr,
    scope: &'static str,
) -> Result<(), HttpError> {
    match limiter.check(client.ip()).await {
        Ok(()) => Ok(()),
        Err(exceeded) => {
            state.metrics.record_rate_limited();
            warn!(client = %client.ip(), scope, "rate limit exceeded");
            Err(HttpError::RateLimited(format!(
                "too many requests, retry in {}s",
                exceeded.retry_after.as_secs().max(1)
            )))
        }
    }
}
