use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    ingest_requests: AtomicU64,
    ingest_rejected: AtomicU64,
    rate_limited: AtomicU64,
    query_requests: AtomicU64,
    store_errors: AtomicU64,
}

impl Metrics {
    pub fn record_ingest(&self) {
        self.ingest_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest_rejected(&self) {
        self.ingest_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self) {
        self.query_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let ingested = self.ingest_requests.load(Ordering::Relaxed);
        let rejected = self.ingest_rejected.load(Ordering::Relaxed);
        let rate_limited = self.rate_limited.load(Ordering::Relaxed);
        let queries = self.query_requests.load(Ordering::Relaxed);
        let store_errors = self.store_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE analytics_ingest_events_total counter\n\
analytics_ingest_events_total {}\n\
# TYPE analytics_ingest_rejected_total counter\n\
analytics_ingest_rejected_total {}\n\
# TYPE analytics_rate_limited_total counter\n\
analytics_rate_limited_total {}\n\
# TYPE analytics_query_requests_total counter\n\
analytics_query_requests_total {}\n\
# TYPE analytics_store_errors_total counter\n\
analytics_store_errors_total {}\n",
            ingested, rejected, rate_limited, queries, store_errors
        )
    }
}
