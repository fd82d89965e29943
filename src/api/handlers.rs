//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::error;

use crate::health::{CheckRunner, HealthResponseWriter, ResultStatusCodes};
use crate::metrics;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Produces the report for each health request.
    pub runner: Arc<dyn CheckRunner>,
    /// Writes report bodies.
    pub writer: HealthResponseWriter,
    /// Status code table for the health route.
    pub status_codes: ResultStatusCodes,
    /// Bearer token for the guarded routes, if any.
    pub api_token: Option<Arc<str>>,
    /// Prometheus handle when metrics are exported.
    pub metrics: Option<PrometheusHandle>,
    /// Service summary for the status endpoint.
    pub service: Arc<ServiceInfo>,
}

impl AppState {
    /// Create new app state with the default status codes and process identity.
    pub fn new(runner: Arc<dyn CheckRunner>, service: ServiceInfo) -> Self {
        Self {
            runner,
            writer: HealthResponseWriter::default(),
            status_codes: ResultStatusCodes::default(),
            api_token: None,
            metrics: None,
            service: Arc::new(service),
        }
    }

    /// Use a specific response writer.
    pub fn with_writer(mut self, writer: HealthResponseWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Require a bearer token on the guarded routes.
    pub fn with_api_token(mut self, token: impl Into<Arc<str>>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Expose metrics through the given handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Static service description served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Whether checks run on health requests.
    pub checks_enabled: bool,
    /// Registered check names.
    pub checks: Vec<String>,
}

impl ServiceInfo {
    /// Describe this package.
    pub fn for_package(checks_enabled: bool, checks: Vec<String>) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks_enabled,
            checks,
        }
    }
}

/// Health report handler.
///
/// Picks the status code from the configured table, then lets the writer
/// fill in the body. A report that cannot be serialized fails the request
/// with 500 and an empty body.
pub async fn healthz(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let report = state.runner.evaluate().await;

    let mut response = Response::new(Body::empty());
    *response.status_mut() = report
        .as_ref()
        .map_or(StatusCode::OK, |report| state.status_codes.code_for(report.status));

    let response = match state.writer.write(&mut response, report.as_ref()) {
        Ok(()) => {
            let status = report.as_ref().map_or("Disabled", |report| report.status.as_ref());
            metrics::inc_health_requests(status);
            response
        }
        Err(e) => {
            error!(error = %e, "Failed to write health report");
            metrics::inc_render_failures();
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };

    metrics::record_health_request_latency(start);
    response
}

/// Status handler - returns the service description.
pub async fn status(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.service.as_ref().clone())
}

/// Metrics handler - renders the Prometheus exposition, 404 when disabled.
pub async fn metrics_export(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
