//! Prometheus metrics for the trendlens service
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails or never ran, metric operations become no-ops.

use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec, Encoder,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

use crate::models::Platform;

/// Container for all service metrics
struct ServiceMetrics {
    fetches: CounterVec,
    fetch_duration: HistogramVec,
    persist_failures: Counter,
    api_requests: CounterVec,
    api_duration: HistogramVec,
}

/// Global storage for service metrics
static SERVICE_METRICS: OnceLock<ServiceMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Initialize all Prometheus metrics
///
/// Should be called once at application startup. Safe to call again;
/// repeat calls are ignored.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = ServiceMetrics {
        fetches: register_counter_vec!(
            "trendlens_fetches_total",
            "Total data-source fetches by platform and outcome",
            &["platform", "outcome"]
        )?,
        fetch_duration: register_histogram_vec!(
            "trendlens_fetch_duration_seconds",
            "Data-source fetch duration in seconds",
            &["platform"],
            vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
        persist_failures: register_counter!(
            "trendlens_persist_failures_total",
            "Total best-effort persistence failures"
        )?,
        api_requests: register_counter_vec!(
            "trendlens_api_requests_total",
            "Total API requests by endpoint and status",
            &["endpoint", "status"]
        )?,
        api_duration: register_histogram_vec!(
            "trendlens_api_request_duration_seconds",
            "API request duration in seconds",
            &["endpoint"],
            vec![0.001, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
    };

    SERVICE_METRICS
        .set(metrics)
        .map_err(|_| "Service metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    SERVICE_METRICS.get().is_some()
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a completed data-source fetch
pub fn record_fetch(platform: Platform, outcome: &str, duration_secs: f64) {
    let Some(m) = SERVICE_METRICS.get() else {
        return;
    };

    m.fetches
        .with_label_values(&[platform.as_str(), outcome])
        .inc();
    m.fetch_duration
        .with_label_values(&[platform.as_str()])
        .observe(duration_secs);
}

/// Record a best-effort persistence failure
pub fn record_persist_failure() {
    if let Some(m) = SERVICE_METRICS.get() {
        m.persist_failures.inc();
    }
}

/// Record an API request
pub fn record_api_request(endpoint: &str, status: u16, duration_secs: f64) {
    let Some(m) = SERVICE_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.api_requests
        .with_label_values(&[endpoint, &status_str])
        .inc();
    m.api_duration
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}
