use anyhow::Result;
use async_trait::async_trait;
use clickhouse::Client;
use serde_json::{Map, Value};
use uuid::Uuid;

use backend_domain::ports::EventRepository;
use backend_domain::{EventFilter, EventRow, NewEvent, StoredEvent};

use crate::utils::{millis_to_utc, utc_to_millis};

#[derive(Clone)]
pub struct ClickhouseEventStore {
    client: Client,
    database: String,
}

impl ClickhouseEventStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

#[async_trait]
impl EventRepository for ClickhouseEventStore {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        // Events are immutable and retention is an external concern, so
        // the table carries no TTL.
        let create_events = r#"
CREATE TABLE IF NOT EXISTS analytics_events (
    event_id String,
    event_time DateTime64(3),
    event_type String,
    session_id String,
    country String,
    page String,
    extra String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, session_id)
"#;

        self.client.query(create_events).execute().await?;
        Ok(())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<String> {
        let event_id = Uuid::new_v4().to_string();
        let mut insert = self.client.insert("analytics_events")?;
        insert
            .write(&EventRow {
                event_id: event_id.clone(),
                event_time: millis_to_utc(event.timestamp_ms),
                event_type: event.event_type.as_str().to_string(),
                session_id: event.session_id.clone(),
                country: event.country.clone(),
                page: event.page.clone(),
                extra: serde_json::to_string(&event.extra)?,
            })
            .await?;
        insert.end().await?;
        Ok(event_id)
    }

    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        let mut sql = String::from(
            "SELECT event_id, event_time, event_type, session_id, country, page, extra \
             FROM analytics_events WHERE 1 = 1",
        );
        // `country` and `session_id` are untrusted free text, so every
        // filter value goes through a bind.
        if filter.event_type.is_some() {
            sql.push_str(" AND event_type = ?");
        }
        if filter.country.is_some() {
            sql.push_str(" AND country = ?");
        }
        if filter.session_id.is_some() {
            sql.push_str(" AND session_id = ?");
        }
        if filter.start_ms.is_some() {
            sql.push_str(" AND event_time >= fromUnixTimestamp64Milli(?)");
        }
        if filter.end_ms.is_some() {
            sql.push_str(" AND event_time <= fromUnixTimestamp64Milli(?)");
        }
        sql.push_str(" ORDER BY event_time DESC");
        sql.push_str(&format!(" LIMIT {}", filter.limit));

        let mut query = self.client.query(&sql);
        if let Some(event_type) = &filter.event_type {
            query = query.bind(event_type.as_str());
        }
        if let Some(country) = &filter.country {
            query = query.bind(country.as_str());
        }
        if let Some(session_id) = &filter.session_id {
            query = query.bind(session_id.as_str());
        }
        if let Some(start_ms) = filter.start_ms {
            query = query.bind(start_ms);
        }
        if let Some(end_ms) = filter.end_ms {
            query = query.bind(end_ms);
        }

        let rows = query.fetch_all::<EventRow>().await?;
        Ok(rows.into_iter().map(row_to_event).collect())
    }

    async fn scan_events(&self) -> Result<Vec<StoredEvent>> {
        let rows = self
            .client
            .query(
                "SELECT event_id, event_time, event_type, session_id, country, page, extra \
                 FROM analytics_events",
            )
            .fetch_all::<EventRow>()
            .await?;
        Ok(rows.into_iter().map(row_to_event).collect())
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

fn row_to_event(row: EventRow) -> StoredEvent {
    let extra = serde_json::from_str::<Map<String, Value>>(&row.extra).unwrap_or_default();
    StoredEvent {
        id: row.event_id,
        timestamp_ms: utc_to_millis(row.event_time),
        event_type: row.event_type,
        session_id: row.session_id,
        country: row.country,
        page: row.page,
        extra,
    }
}
