//! REST API handlers for the trendlens server
//!
//! This module defines the API routes and handlers. All trend endpoints
//! share one flow: verify the API key, validate the query, run the
//! aggregation pipeline, and wrap failures in the `{detail}` envelope.

use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::models::{Platform, TrendReport};
use crate::server::auth::verify_api_key;

use super::server::AppState;

// ============================================================================
// API Types
// ============================================================================

/// Query parameters shared by the trend endpoints
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub query: Option<String>,
    pub api_key: Option<String>,
}

/// Error envelope returned on every failure path
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: message.into(),
        }
    }
}

/// Liveness payload for the root endpoint
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: String,
    pub message: String,
    pub endpoints: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage_connected: bool,
}

/// Redacted config report for the debug route
#[derive(Debug, Serialize)]
pub struct DebugEnvResponse {
    pub api_key_set: bool,
    pub database_url_set: bool,
    pub google_base_url: Option<String>,
    pub reddit_base_url: Option<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

// ============================================================================
// Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/google-trends", get(google_trends))
        .route("/api/reddit-trends", get(reddit_trends))
        .route("/metrics", get(metrics_text));

    if state.server.enable_debug_routes {
        router = router.route("/api/debug/env", get(debug_env));
    }

    router.with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Root endpoint - liveness
async fn root() -> impl IntoResponse {
    Json(LivenessResponse {
        status: "live".to_string(),
        message: format!("trendlens {} - ready", env!("CARGO_PKG_VERSION")),
        endpoints: vec![
            "/api/health".to_string(),
            "/api/google-trends?query=<q>&api_key=<key>".to_string(),
            "/api/reddit-trends?query=<q>&api_key=<key>".to_string(),
        ],
    })
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_connected = state.sink.is_connected().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        storage_connected,
    })
}

/// Google Trends aggregation endpoint
async fn google_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Response {
    trends(state, params, Platform::Google, "/api/google-trends").await
}

/// Reddit aggregation endpoint
async fn reddit_trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Response {
    trends(state, params, Platform::Reddit, "/api/reddit-trends").await
}

/// Shared flow for the trend endpoints
async fn trends(
    state: AppState,
    params: TrendParams,
    platform: Platform,
    endpoint: &'static str,
) -> Response {
    let start = Instant::now();

    let result = process_trends(&state, params, platform).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err((status, _)) => *status,
    };

    metrics::record_api_request(endpoint, status.as_u16(), start.elapsed().as_secs_f64());

    match result {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err((status, detail)) => (status, Json(ErrorDetail::new(detail))).into_response(),
    }
}

/// Auth, validation, and aggregation for one trend request.
///
/// Key verification comes first: a rejected request must not reach any
/// data source.
async fn process_trends(
    state: &AppState,
    params: TrendParams,
    platform: Platform,
) -> Result<TrendReport, (StatusCode, String)> {
    if let Err(rejection) =
        verify_api_key(&state.config.auth.api_key, params.api_key.as_deref())
    {
        return Err((StatusCode::FORBIDDEN, rejection.detail().to_string()));
    }

    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "query must not be empty".to_string(),
        ));
    }

    state
        .aggregator
        .fetch_and_analyze(platform, &query)
        .await
        .map_err(|e| {
            tracing::error!(platform = %platform, error = %e, "aggregation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.detail())
        })
}

/// Prometheus text exposition
async fn metrics_text() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new(format!("failed to encode metrics: {e}"))),
        )
            .into_response(),
    }
}

/// Redacted configuration report (debug builds of the deployment only)
async fn debug_env(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;

    Json(DebugEnvResponse {
        api_key_set: !config.auth.api_key.is_empty(),
        database_url_set: !config.database.postgres_url.is_empty(),
        google_base_url: config.sources.google_base_url.clone(),
        reddit_base_url: config.sources.reddit_base_url.clone(),
        user_agent: config.sources.user_agent.clone(),
        request_timeout_secs: config.sources.request_timeout_secs,
    })
}
