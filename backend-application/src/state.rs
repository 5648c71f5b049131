use std::sync::Arc;

use backend_domain::ports::EventRepository;
use backend_domain::RuntimeConfig;

use crate::rate_limit::RateLimits;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub rate_limits: Arc<RateLimits>,
    pub metrics: Arc<Metrics>,
}
