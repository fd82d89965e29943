//! Prometheus metrics for the health endpoint and the checks behind it.
//!
//! This module provides metrics for:
//! - Health requests by overall status
//! - Report rendering failures
//! - Per-check latency
//! - Health request latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use time::Duration;
use tracing::debug;

// === Metric Name Constants ===

/// Health requests counter metric name.
pub const METRIC_HEALTH_REQUESTS: &str = "health_requests_total";
/// Report rendering failures counter metric name.
pub const METRIC_HEALTH_RENDER_FAILURES: &str = "health_render_failures_total";
/// Per-check latency metric name.
pub const METRIC_CHECK_LATENCY: &str = "health_check_latency_ms";
/// Health request latency metric name.
pub const METRIC_HEALTH_REQUEST_LATENCY: &str = "health_request_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_HEALTH_REQUESTS,
        "Total number of health requests by overall status"
    );
    describe_counter!(
        METRIC_HEALTH_RENDER_FAILURES,
        "Total number of health reports that could not be serialized"
    );
    describe_histogram!(
        METRIC_CHECK_LATENCY,
        "Health check execution latency in milliseconds"
    );
    describe_histogram!(
        METRIC_HEALTH_REQUEST_LATENCY,
        "Health request latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment the health request counter for an overall status.
///
/// `status` is `"Disabled"` when no report was produced.
pub fn inc_health_requests(status: &str) {
    counter!(METRIC_HEALTH_REQUESTS, "status" => status.to_string()).increment(1);
}

/// Increment the render failures counter.
pub fn inc_render_failures() {
    counter!(METRIC_HEALTH_RENDER_FAILURES).increment(1);
}

/// Record how long a single check took.
pub fn record_check_latency(check: &str, duration: Duration) {
    let latency_ms = duration.as_seconds_f64() * 1000.0;
    histogram!(METRIC_CHECK_LATENCY, "check" => check.to_string()).record(latency_ms);
}

/// Record health request latency.
pub fn record_health_request_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HEALTH_REQUEST_LATENCY).record(latency_ms);
}
