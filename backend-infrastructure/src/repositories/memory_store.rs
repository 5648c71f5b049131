use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use backend_domain::ports::EventRepository;
use backend_domain::{EventFilter, NewEvent, StoredEvent};

/// In-memory event store with the same id and ordering semantics as the
/// ClickHouse store. Selected with `store_backend = "memory"` for local
/// runs without a database; the integration tests inject it as the store
/// substitute.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<StoredEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryEventStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<String> {
        let event_id = Uuid::new_v4().to_string();
        self.events.write().await.push(StoredEvent {
            id: event_id.clone(),
            timestamp_ms: event.timestamp_ms,
            event_type: event.event_type.as_str().to_string(),
            session_id: event.session_id.clone(),
            country: event.country.clone(),
            page: event.page.clone(),
            extra: event.extra.clone(),
        });
        Ok(event_id)
    }

    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>> {
        let events = self.events.read().await;
        let mut matched: Vec<StoredEvent> = events
            .iter()
            .filter(|event| matches_filter(event, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        matched.truncate(filter.limit);
        Ok(matched)
    }

    async fn scan_events(&self) -> Result<Vec<StoredEvent>> {
        Ok(self.events.read().await.clone())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

fn matches_filter(event: &StoredEvent, filter: &EventFilter) -> bool {
    if let Some(event_type) = &filter.event_type {
        if &event.event_type != event_type {
            return false;
        }
    }
    if let Some(country) = &filter.country {
        if &event.country != country {
            return false;
        }
    }
    if let Some(session_id) = &filter.session_id {
        if &event.session_id != session_id {
            return false;
        }
    }
    if let Some(start_ms) = filter.start_ms {
        if event.timestamp_ms < start_ms {
            return false;
        }
    }
    if let Some(end_ms) = filter.end_ms {
        if event.timestamp_ms > end_ms {
            return false;
        }
    }
    true
}
