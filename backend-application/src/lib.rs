// Backend Application Layer

pub mod commands;
pub mod dtos;
pub mod error;
pub mod metrics;
pub mod queries;
pub mod rate_limit;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use rate_limit::{FixedWindowLimiter, RateLimitExceeded, RateLimits};
pub use state::AppState;
