use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use backend_domain::RuntimeConfig;

/// Tracked-key ceiling before expired windows are swept out of the map.
const SWEEP_THRESHOLD: usize = 4096;

/// Fixed-window request counter keyed by client address.
///
/// Every attempt consumes a slot in its window, rejected attempts
/// included, so hammering a limited endpoint cannot shorten the wait.
/// Windows reset purely by elapsed time.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, WindowState>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, key: IpAddr) -> Result<(), RateLimitExceeded> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: IpAddr, now: Instant) -> Result<(), RateLimitExceeded> {
        let mut windows = self.windows.lock().await;
        if windows.len() > SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, state| now.duration_since(state.started_at) < window);
        }

        let state = windows.entry(key).or_insert(WindowState {
            started_at: now,
            count: 0,
        });
        if now.duration_since(state.started_at) >= self.window {
            state.started_at = now;
            state.count = 0;
        }
        state.count = state.count.saturating_add(1);

        if state.count > self.max_requests {
            let elapsed = now.duration_since(state.started_at);
            return Err(RateLimitExceeded {
                retry_after: self.window.saturating_sub(elapsed),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    async fn window_count(&self, key: IpAddr) -> u32 {
        self.windows
            .lock()
            .await
            .get(&key)
            .map(|state| state.count)
            .unwrap_or(0)
    }
}

/// The two windows the API enforces: a general one on every `/api/v1`
/// route and a tighter one on ingestion alone.
#[derive(Debug)]
pub struct RateLimits {
    pub api: FixedWindowLimiter,
    pub ingest: FixedWindowLimiter,
}

impl RateLimits {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            api: FixedWindowLimiter::new(
                config.api_limit_requests,
                Duration::from_secs(config.api_limit_window_seconds),
            ),
            ingest: FixedWindowLimiter::new(
                config.ingest_limit_requests,
                Duration::from_secs(config.ingest_limit_window_seconds),
            ),
        }
    }
}
