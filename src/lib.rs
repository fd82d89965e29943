//! Health reporting for Rust services.
//!
//! Runs the registered health checks on every request and serves the result
//! on `GET /healthz` as a stable JSON document:
//!
//! ```text
//! {"status":"Healthy","totalDuration":"00:00:00.0012345",
//!  "assembly":"MyService, Version=1.0.0.0","assemblies":["MyService","Core.Lib"],
//!  "entries":[{"name":"self","status":"Healthy","duration":"00:00:00.0000010",
//!              "tags":[],"data":{}}]}
//! ```
//!
//! Healthy and Degraded reports are served with 200, Unhealthy with 503.
//! When checks are disabled the body is `{}`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`health`]: Check runner, report projection and serialization
//! - [`api`]: HTTP API for health, status and metrics
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{HealthError, Result};
