//! End-to-end tests for the HTTP API
//!
//! Each test builds the real router around an in-memory sink and mock
//! data sources, then drives it with tower's oneshot. The auth tests
//! assert on mock call counts: a rejected request must never reach a
//! data source.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use trendlens::config::Config;
use trendlens::server::{AppState, ServerConfig, TrendServer};
use trendlens::storage::{FailingTrendSink, MemoryTrendSink, TrendSink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-secret";

fn test_config(source_base: &str) -> Config {
    let mut config = Config::default();
    config.auth.api_key = API_KEY.to_string();
    config.sources.google_base_url = Some(source_base.to_string());
    config.sources.reddit_base_url = Some(source_base.to_string());
    config.sources.rate_limit = 100;
    config
}

fn build_router(config: Config, server: ServerConfig, sink: Arc<dyn TrendSink>) -> axum::Router {
    let state = AppState::new(config, server, sink).unwrap();
    TrendServer::from_state(state).build_router()
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

fn reddit_listing(posts: Value) -> Value {
    serde_json::json!({"kind": "Listing", "data": {"children": posts}})
}

fn reddit_post(title: &str, score: i64, num_comments: i64) -> Value {
    serde_json::json!({"kind": "t3", "data": {
        "title": title,
        "selftext": "",
        "score": score,
        "num_comments": num_comments,
        "created_utc": 1700000000.0,
        "subreddit": "all"
    }})
}

async fn mount_reddit(server: &MockServer, posts: Value) {
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_listing(posts)))
        .mount(server)
        .await;
}

/// Mount the full Google widget flow with the given timeline entries
async fn mount_google(server: &MockServer, timeline: Value) {
    let explore = serde_json::json!({
        "widgets": [
            {"id": "TIMESERIES", "token": "tok-ts", "request": {}},
            {"id": "RELATED_QUERIES", "token": "tok-rq", "request": {}},
            {"id": "GEO_MAP", "token": "tok-geo", "request": {}},
        ]
    });
    let multiline = serde_json::json!({"default": {"timelineData": timeline}});
    let related = serde_json::json!({"default": {"rankedList": []}});
    let geo = serde_json::json!({"default": {"geoMapData": []}});

    for (p, body) in [
        ("/trends/api/explore", explore),
        ("/trends/api/widgetdata/multiline", multiline),
        ("/trends/api/widgetdata/relatedsearches", related),
        ("/trends/api/widgetdata/comparedgeo", geo),
    ] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(")]}}'\n{body}")))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn invalid_api_key_rejected_before_any_fetch() {
    let server = MockServer::start().await;

    // No outbound request may reach the source on the reject path
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(MemoryTrendSink::new());
    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        sink.clone(),
    );

    let (status, body) = get(
        router,
        "/api/reddit-trends?query=ai&api_key=wrong-key",
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Invalid API key");
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn missing_api_key_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let (status, body) = get(router, "/api/reddit-trends?query=ai").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Missing API key");
}

#[tokio::test]
async fn empty_query_is_bad_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let uri = format!("/api/reddit-trends?query=%20%20&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "query must not be empty");
}

#[tokio::test]
async fn reddit_happy_path_returns_report_and_persists() {
    let server = MockServer::start().await;
    mount_reddit(
        &server,
        serde_json::json!([
            reddit_post("ten points", 10, 3),
            reddit_post("fifty points", 50, 12),
            reddit_post("five points", 5, 1),
        ]),
    )
    .await;

    let sink = Arc::new(MemoryTrendSink::new());
    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        sink.clone(),
    );

    let uri = format!("/api/reddit-trends?query=ai&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "reddit");
    assert_eq!(body["raw"].as_array().unwrap().len(), 3);

    let top_posts = body["analysis"]["top_posts"].as_array().unwrap();
    assert_eq!(top_posts[0]["score"], 50);
    assert_eq!(top_posts[1]["score"], 10);
    assert_eq!(top_posts[2]["score"], 5);
    assert_eq!(
        body["analysis"]["insights"],
        "Top post: fifty points (50 points, 12 comments)"
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query, "ai");
}

#[tokio::test]
async fn reddit_empty_results_return_sentinel_without_persisting() {
    let server = MockServer::start().await;
    mount_reddit(&server, serde_json::json!([])).await;

    let sink = Arc::new(MemoryTrendSink::new());
    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        sink.clone(),
    );

    let uri = format!("/api/reddit-trends?query=nothing&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw"], serde_json::json!([]));
    assert_eq!(body["analysis"]["insights"], "No results found");
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn reddit_source_failure_maps_to_error_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let uri = format!("/api/reddit-trends?query=ai&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("reddit trends fetch failed"), "{detail}");
}

#[tokio::test]
async fn google_empty_series_returns_sentinel() {
    let server = MockServer::start().await;
    mount_google(&server, serde_json::json!([])).await;

    let sink = Arc::new(MemoryTrendSink::new());
    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        sink.clone(),
    );

    let uri = format!("/api/google-trends?query=obscure&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "google");
    assert_eq!(body["analysis"]["rising_keywords"], serde_json::json!([]));
    assert_eq!(body["analysis"]["insights"], "Top rising: N/A");

    // Empty series is still a successful aggregation and gets recorded
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn google_happy_path_ranks_rising_keyword() {
    let server = MockServer::start().await;
    mount_google(
        &server,
        serde_json::json!([
            {"time": "1573344000", "formattedTime": "Nov 10, 2019", "value": [40.0]},
            {"time": "1573948800", "formattedTime": "Nov 17, 2019", "value": [80.0]},
        ]),
    )
    .await;

    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let uri = format!("/api/google-trends?query=ai&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    let rising = body["analysis"]["rising_keywords"].as_array().unwrap();
    assert_eq!(rising.len(), 1);
    assert_eq!(rising[0]["keyword"], "ai");
    assert_eq!(body["analysis"]["insights"], "Top rising: ai");
}

#[tokio::test]
async fn unreachable_sink_does_not_fail_the_request() {
    let server = MockServer::start().await;
    mount_reddit(&server, serde_json::json!([reddit_post("only", 7, 2)])).await;

    let router = build_router(
        test_config(&server.uri()),
        ServerConfig::default(),
        Arc::new(FailingTrendSink),
    );

    let uri = format!("/api/reddit-trends?query=ai&api_key={API_KEY}");
    let (status, body) = get(router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["top_posts"][0]["score"], 7);
}

#[tokio::test]
async fn root_reports_liveness() {
    let router = build_router(
        test_config("http://127.0.0.1:9"),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let (status, body) = get(router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");
}

#[tokio::test]
async fn health_reports_storage_connectivity() {
    let router = build_router(
        test_config("http://127.0.0.1:9"),
        ServerConfig::default(),
        Arc::new(MemoryTrendSink::new()),
    );

    let (status, body) = get(router, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage_connected"], true);
}

#[tokio::test]
async fn health_reports_disconnected_sink() {
    let router = build_router(
        test_config("http://127.0.0.1:9"),
        ServerConfig::default(),
        Arc::new(FailingTrendSink),
    );

    let (_, body) = get(router, "/api/health").await;
    assert_eq!(body["storage_connected"], false);
}

#[tokio::test]
async fn debug_route_only_exists_when_enabled() {
    let sink = Arc::new(MemoryTrendSink::new());

    let hidden = build_router(
        test_config("http://127.0.0.1:9"),
        ServerConfig::default(),
        sink.clone(),
    );
    let (status, _) = get(hidden, "/api/debug/env").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let exposed = build_router(
        test_config("http://127.0.0.1:9"),
        ServerConfig::builder()
            .enable_debug_routes(true)
            .build()
            .unwrap(),
        sink,
    );
    let (status, body) = get(exposed, "/api/debug/env").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_key_set"], true);
    assert_eq!(body["database_url_set"], true);
    // Secrets themselves are never echoed back
    assert!(body.get("api_key").is_none());
}
