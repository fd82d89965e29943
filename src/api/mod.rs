//! HTTP API module for the health, status and metrics endpoints.

pub mod auth;
pub mod handlers;
pub mod routes;

pub use handlers::{AppState, ServiceInfo};
pub use routes::{create_router, health_router, HEALTH_PATH};
