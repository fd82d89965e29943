//! HTTP API route definitions.

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth::require_api_token;
use super::handlers::{healthz, metrics_export, status, AppState};

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/healthz";

/// Create the API router.
///
/// The health route is merged outside the token guard so monitors can always
/// reach it.
pub fn create_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/api/v1/status", get(status))
        .route("/metrics", get(metrics_export))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_token,
        ));

    Router::new()
        .route(HEALTH_PATH, get(healthz))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create a minimal health-only router.
pub fn health_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(healthz))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::ServiceInfo;
    use crate::health::{HealthCheckResult, HealthChecks};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state_with(result: fn() -> HealthCheckResult) -> AppState {
        let mut checks = HealthChecks::default();
        checks.add_sync_check("probe", Vec::<String>::new(), result).unwrap();
        AppState::new(
            Arc::new(checks),
            ServiceInfo::for_package(true, vec!["probe".to_string()]),
        )
    }

    async fn get_status(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn healthy_and_degraded_return_200() {
        let healthy = create_router(state_with(HealthCheckResult::healthy));
        assert_eq!(get_status(healthy, HEALTH_PATH, None).await, StatusCode::OK);

        let degraded = create_router(state_with(|| HealthCheckResult::degraded("slow")));
        assert_eq!(get_status(degraded, HEALTH_PATH, None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn unhealthy_returns_503() {
        let app = create_router(state_with(|| HealthCheckResult::unhealthy("down")));
        assert_eq!(
            get_status(app, HEALTH_PATH, None).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn health_bypasses_token_guard() {
        let state = state_with(HealthCheckResult::healthy).with_api_token("secret");

        let app = create_router(state.clone());
        assert_eq!(get_status(app, HEALTH_PATH, None).await, StatusCode::OK);

        let app = create_router(state.clone());
        assert_eq!(
            get_status(app, "/api/v1/status", None).await,
            StatusCode::UNAUTHORIZED
        );

        let app = create_router(state);
        assert_eq!(
            get_status(app, "/api/v1/status", Some("secret")).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn metrics_route_is_not_found_without_exporter() {
        let app = create_router(state_with(HealthCheckResult::healthy));
        assert_eq!(get_status(app, "/metrics", None).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_router_serves_only_health() {
        let state = state_with(HealthCheckResult::healthy);
        assert_eq!(
            get_status(health_router(state.clone()), HEALTH_PATH, None).await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(health_router(state), "/api/v1/status", None).await,
            StatusCode::NOT_FOUND
        );
    }
}
