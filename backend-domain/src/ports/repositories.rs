use async_trait::async_trait;

use crate::entities::{EventFilter, NewEvent, StoredEvent};

/// The store handle injected into every endpoint. The collection is an
/// opaque keyed, queryable, timestamp-ordered store; implementations must
/// assign the id on create.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    /// Creates one event and returns the store-assigned id.
    async fn insert_event(&self, event: &NewEvent) -> anyhow::Result<String>;
    /// Conjunctive filters, timestamp descending, bounded by `filter.limit`.
    async fn fetch_events(&self, filter: &EventFilter) -> anyhow::Result<Vec<StoredEvent>>;
    /// Full-collection scan for aggregation.
    async fn scan_events(&self) -> anyhow::Result<Vec<StoredEvent>>;
    async fn ping(&self) -> anyhow::Result<()>;
}
