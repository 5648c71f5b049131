use std::sync::Arc;

use anyhow::{anyhow, Result};
use clickhouse::Client;
use tracing::warn;

use backend_application::{AppState, Metrics, RateLimits};
use backend_domain::ports::EventRepository;
use backend_infrastructure::{AppConfig, ClickhouseEventStore, MemoryEventStore};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let store_config = config.to_store_config();

        let event_repo: Arc<dyn EventRepository> = match store_config.backend.as_str() {
            "memory" => {
                warn!("using in-memory event store, events are lost on restart");
                Arc::new(MemoryEventStore::new())
            }
            "clickhouse" => {
                let mut clickhouse = Client::default()
                    .with_url(&store_config.clickhouse_url)
                    .with_database(&store_config.clickhouse_database);
                if let Some(user) = &store_config.clickhouse_user {
                    clickhouse = clickhouse.with_user(user);
                }
                if let Some(password) = &store_config.clickhouse_password {
                    clickhouse = clickhouse.with_password(password);
                }
                Arc::new(ClickhouseEventStore::new(
                    clickhouse,
                    store_config.clickhouse_database.clone(),
                ))
            }
            other => return Err(anyhow!("unknown store backend '{}'", other)),
        };
        event_repo.ensure_schema().await?;

        let rate_limits = Arc::new(RateLimits::from_config(&runtime_config));

        let state = AppState {
            config: runtime_config,
            event_repo,
            rate_limits,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
