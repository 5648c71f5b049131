use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{RuntimeConfig, StoreConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub page_label: String,
    pub store_backend: String,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub api_limit_requests: u32,
    pub api_limit_window_seconds: u64,
    pub ingest_limit_requests: u32,
    pub ingest_limit_window_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            page_label: "blog".to_string(),
            store_backend: "clickhouse".to_string(),
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "analytics".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            api_limit_requests: 10,
            api_limit_window_seconds: 15 * 60,
            ingest_limit_requests: 1,
            ingest_limit_window_seconds: 60,
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("ANALYTICS_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(user) = &self.clickhouse_user {
            if user.trim().is_empty() {
                self.clickhouse_user = None;
            }
        }
        if let Some(password) = &self.clickhouse_password {
            if password.trim().is_empty() {
                self.clickhouse_password = None;
            }
        }
        self.store_backend = self.store_backend.trim().to_lowercase();
        self.allowed_origins = normalize_origin_list(std::mem::take(&mut self.allowed_origins));
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.page_label.trim().is_empty() {
            return Err(anyhow!("page_label must not be empty"));
        }
        if self.store_backend != "clickhouse" && self.store_backend != "memory" {
            return Err(anyhow!(
                "unknown store_backend '{}', expected 'clickhouse' or 'memory'",
                self.store_backend
            ));
        }
        if self.api_limit_requests == 0 || self.ingest_limit_requests == 0 {
            return Err(anyhow!("rate limit request counts must be greater than 0"));
        }
        if self.api_limit_window_seconds == 0 || self.ingest_limit_window_seconds == 0 {
            return Err(anyhow!("rate limit windows must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            allowed_origins: self.allowed_origins.clone(),
            page_label: self.page_label.clone(),
            api_limit_requests: self.api_limit_requests,
            api_limit_window_seconds: self.api_limit_window_seconds,
            ingest_limit_requests: self.ingest_limit_requests,
            ingest_limit_window_seconds: self.ingest_limit_window_seconds,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.store_backend.clone(),
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ANALYTICS_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ANALYTICS_ALLOWED_ORIGINS") {
            self.allowed_origins = parse_env_origin_list(&value);
        }
        if let Ok(value) = env::var("ANALYTICS_PAGE_LABEL") {
            self.page_label = value;
        }
        if let Ok(value) = env::var("ANALYTICS_STORE_BACKEND") {
            self.store_backend = value;
        }
        if let Ok(value) = env::var("ANALYTICS_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("ANALYTICS_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("ANALYTICS_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("ANALYTICS_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("ANALYTICS_API_LIMIT_REQUESTS") {
            self.api_limit_requests = value.parse().unwrap_or(self.api_limit_requests);
        }
        if let Ok(value) = env::var("ANALYTICS_API_LIMIT_WINDOW_SECONDS") {
            self.api_limit_window_seconds = value.parse().unwrap_or(self.api_limit_window_seconds);
        }
        if let Ok(value) = env::var("ANALYTICS_INGEST_LIMIT_REQUESTS") {
            self.ingest_limit_requests = value.parse().unwrap_or(self.ingest_limit_requests);
        }
        if let Ok(value) = env::var("ANALYTICS_INGEST_LIMIT_WINDOW_SECONDS") {
            self.ingest_limit_window_seconds =
                value.parse().unwrap_or(self.ingest_limit_window_seconds);
        }
        if let Ok(value) = env::var("ANALYTICS_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("ANALYTICS_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn parse_env_origin_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_origin_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().trim_end_matches('/').to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
