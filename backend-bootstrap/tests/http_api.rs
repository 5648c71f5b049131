//! End-to-end tests of the HTTP surface over the in-memory event store.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use backend_application::{AppState, Metrics, RateLimits};
use backend_domain::value_objects::EventType;
use backend_domain::NewEvent;
use backend_infrastructure::MemoryEventStore;
use backend_interfaces_http::build_router;

// 2025-03-01..04 at midnight UTC, in unix millis.
const MAR_1: i64 = 1_740_787_200_000;
const MAR_2: i64 = 1_740_873_600_000;
const MAR_3: i64 = 1_740_960_000_000;
const MAR_4: i64 = 1_741_046_400_000;

fn test_config() -> backend_domain::RuntimeConfig {
    backend_domain::RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        page_label: "blog".to_string(),
        // Generous windows so individual tests opt in to tight ones.
        api_limit_requests: 1000,
        api_limit_window_seconds: 900,
        ingest_limit_requests: 1000,
        ingest_limit_window_seconds: 60,
        max_body_bytes: 64 * 1024,
        request_timeout_seconds: 15,
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryEventStore>,
}

fn test_app(config: backend_domain::RuntimeConfig) -> TestApp {
    let store = Arc::new(MemoryEventStore::new());
    let state = AppState {
        rate_limits: Arc::new(RateLimits::from_config(&config)),
        config,
        event_repo: store.clone(),
        metrics: Arc::new(Metrics::default()),
    };
    TestApp {
        router: build_router(state),
        store,
    }
}

fn client(last: u8) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, last], 40000))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn post_event(router: &Router, from: SocketAddr, payload: &Value) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/v1/analytics")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(from));
    send(router, request).await
}

async fn get(router: &Router, from: SocketAddr, uri: &str) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(from));
    send(router, request).await
}

async fn seed(
    store: &MemoryEventStore,
    event_type: EventType,
    session: &str,
    country: &str,
    timestamp_ms: i64,
    extra: Value,
) {
    use backend_domain::ports::EventRepository;
    store
        .insert_event(&NewEvent {
            event_type,
            session_id: session.to_string(),
            country: country.to_string(),
            page: "blog".to_string(),
            timestamp_ms,
            extra: extra.as_object().cloned().unwrap_or_default(),
        })
        .await
        .unwrap();
}

fn valid_visit(session: &str) -> Value {
    json!({
        "type": "page_visit",
        "sessionId": session,
        "country": "Chile",
    })
}

#[tokio::test]
async fn health_reports_store_reachable() {
    let app = test_app(test_config());
    let (status, body) = get(&app.router, client(1), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "reachable");
}

#[tokio::test]
async fn ingest_valid_event_returns_201_and_persists() {
    use backend_domain::ports::EventRepository;
    let app = test_app(test_config());
    let before_ms = chrono::Utc::now().timestamp_millis();

    let (status, body) = post_event(&app.router, client(1), &valid_visit("s1")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["type"], "page_visit");
    assert!(!body["eventId"].as_str().unwrap().is_empty());
    assert!(body["timestamp"].as_str().unwrap().contains('T'));

    let events = app.store.scan_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, body["eventId"].as_str().unwrap());
    assert_eq!(events[0].page, "blog");
    assert!(events[0].timestamp_ms >= before_ms);
}

#[tokio::test]
async fn ingest_rejects_types_outside_the_enumeration() {
    use backend_domain::ports::EventRepository;
    let app = test_app(test_config());
    let payload = json!({
        "type": "scroll",
        "sessionId": "s1",
        "country": "Chile",
    });

    let (status, body) = post_event(&app.router, client(1), &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("invalid event type 'scroll'"));
    // The rejection detail names the allowed set.
    assert!(error.contains("page_visit"));
    assert!(error.contains("code_copy"));

    assert!(app.store.scan_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn image_view_without_numeric_index_is_rejected() {
    use backend_domain::ports::EventRepository;
    let app = test_app(test_config());
    let payload = json!({
        "type": "image_view",
        "sessionId": "s1",
        "country": "Chile",
        "extra": {"imageIndex": "front"},
    });

    let (status, body) = post_event(&app.router, client(1), &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("imageIndex"));
    assert!(app.store.scan_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn code_copy_without_version_is_rejected() {
    use backend_domain::ports::EventRepository;
    let app = test_app(test_config());
    let payload = json!({
        "type": "code_copy",
        "sessionId": "s1",
        "country": "Chile",
        "extra": {},
    });

    let (status, body) = post_event(&app.router, client(1), &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("codeVersion"));
    assert!(app.store.scan_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = test_app(test_config());
    let mut request = Request::builder()
        .method("POST")
        .uri("/api/v1/analytics")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(client(1)));
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_ingest_in_the_window_is_rate_limited() {
    let mut config = test_config();
    config.ingest_limit_requests = 1;
    config.ingest_limit_window_seconds = 60;
    let app = test_app(config);

    let (status, _) = post_event(&app.router, client(1), &valid_visit("s1")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_event(&app.router, client(1), &valid_visit("s1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("too many requests"));

    // Another client address gets its own window.
    let (status, _) = post_event(&app.router, client(2), &valid_visit("s2")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn general_window_covers_the_query_routes() {
    let mut config = test_config();
    config.api_limit_requests = 2;
    let app = test_app(config);

    for _ in 0..2 {
        let (status, _) = get(&app.router, client(1), "/api/v1/analytics/stats").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = get(&app.router, client(1), "/api/v1/analytics/stats").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn stats_filters_compose_conjunctively_most_recent_first() {
    let app = test_app(test_config());
    seed(&app.store, EventType::PageVisit, "s1", "Chile", MAR_1, json!({})).await;
    seed(&app.store, EventType::PageVisit, "s2", "Peru", MAR_2, json!({})).await;
    seed(&app.store, EventType::ModalOpen, "s1", "Chile", MAR_3, json!({})).await;
    seed(&app.store, EventType::PageVisit, "s1", "Chile", MAR_4, json!({})).await;

    let (status, body) = get(
        &app.router,
        client(1),
        "/api/v1/analytics/stats?type=page_visit&country=Chile",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["filters"]["type"], "page_visit");
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    for event in events {
        assert_eq!(event["type"], "page_visit");
        assert_eq!(event["country"], "Chile");
    }
    // Most recent first, with resolved timestamps.
    assert_eq!(events[0]["timestamp"], "2025-03-04T00:00:00.000Z");
    assert_eq!(events[1]["timestamp"], "2025-03-01T00:00:00.000Z");
}

#[tokio::test]
async fn stats_date_bounds_are_inclusive() {
    let app = test_app(test_config());
    for (ts, session) in [(MAR_1, "a"), (MAR_2, "b"), (MAR_3, "c"), (MAR_4, "d")] {
        seed(&app.store, EventType::PageVisit, session, "Chile", ts, json!({})).await;
    }

    let (status, body) = get(
        &app.router,
        client(1),
        "/api/v1/analytics/stats?startDate=2025-03-02&endDate=2025-03-03",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events[0]["sessionId"], "c");
    assert_eq!(events[1]["sessionId"], "b");
}

#[tokio::test]
async fn stats_limit_bounds_the_page() {
    let app = test_app(test_config());
    for (ts, session) in [(MAR_1, "a"), (MAR_2, "b"), (MAR_3, "c"), (MAR_4, "d")] {
        seed(&app.store, EventType::PageVisit, session, "Chile", ts, json!({})).await;
    }

    let (status, body) = get(&app.router, client(1), "/api/v1/analytics/stats?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events[0]["sessionId"], "d");
    assert_eq!(events[1]["sessionId"], "c");
}

#[tokio::test]
async fn stats_empty_result_is_not_an_error() {
    let app = test_app(test_config());
    let (status, body) = get(
        &app.router,
        client(1),
        "/api/v1/analytics/stats?type=code_copy",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["events"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stats_rejects_unparseable_dates() {
    let app = test_app(test_config());
    let (status, _) = get(
        &app.router,
        client(1),
        "/api/v1/analytics/stats?startDate=yesterday",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_aggregates_the_whole_store() {
    let app = test_app(test_config());
    seed(&app.store, EventType::PageVisit, "s1", "Chile", MAR_1, json!({})).await;
    seed(&app.store, EventType::PageVisit, "s1", "Peru", MAR_2, json!({})).await;
    seed(
        &app.store,
        EventType::CodeCopy,
        "s2",
        "Chile",
        MAR_3,
        json!({"codeVersion": "v2"}),
    )
    .await;
    seed(
        &app.store,
        EventType::ImageView,
        "s2",
        "Chile",
        MAR_4,
        json!({"imageIndex": 3}),
    )
    .await;

    let (status, body) = get(&app.router, client(1), "/api/v1/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["summary"];
    assert_eq!(summary["totalEvents"], 4);
    assert_eq!(summary["eventTypes"]["page_visit"], 2);
    assert_eq!(summary["eventTypes"]["code_copy"], 1);
    assert_eq!(summary["countries"]["Chile"], 3);
    assert_eq!(summary["countries"]["Peru"], 1);
    // s1, s1, s2, s2 -> two distinct sessions.
    assert_eq!(summary["uniqueSessions"], 2);
    assert_eq!(summary["codeVersions"]["v2"], 1);
    assert_eq!(summary["imageViews"]["3"], 1);
    assert_eq!(summary["dateRange"]["oldest"], "2025-03-01T00:00:00.000Z");
    assert_eq!(summary["dateRange"]["newest"], "2025-03-04T00:00:00.000Z");
}

#[tokio::test]
async fn summary_of_an_empty_store_is_all_zeroes_and_nulls() {
    let app = test_app(test_config());
    let (status, body) = get(&app.router, client(1), "/api/v1/analytics/summary").await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["summary"];
    assert_eq!(summary["totalEvents"], 0);
    assert_eq!(summary["uniqueSessions"], 0);
    assert_eq!(summary["dateRange"]["oldest"], Value::Null);
    assert_eq!(summary["dateRange"]["newest"], Value::Null);
}

#[tokio::test]
async fn identical_submissions_produce_distinct_events() {
    use backend_domain::ports::EventRepository;
    let app = test_app(test_config());
    let payload = valid_visit("s1");

    let (_, first) = post_event(&app.router, client(1), &payload).await;
    let (_, second) = post_event(&app.router, client(1), &payload).await;
    assert_ne!(first["eventId"], second["eventId"]);
    assert_eq!(app.store.scan_events().await.unwrap().len(), 2);
}

#[tokio::test]
async fn cors_headers_only_go_to_allow_listed_origins() {
    let config = test_config();
    let store = Arc::new(MemoryEventStore::new());
    let state = AppState {
        rate_limits: Arc::new(RateLimits::from_config(&config)),
        config,
        event_repo: store,
        metrics: Arc::new(Metrics::default()),
    };
    let app = backend_bootstrap::build_app(state);

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/analytics")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert!(response.headers().contains_key("access-control-max-age"));

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/analytics")
        .header("origin", "https://evil.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(preflight).await.unwrap();
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn unknown_routes_get_a_404_payload() {
    let app = test_app(test_config());
    let (status, body) = get(&app.router, client(1), "/api/v2/analytics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}
