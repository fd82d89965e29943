//! Health status values and their mapping to HTTP status codes.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Outcome of a health check or of a whole report.
///
/// Rendered on the wire by its symbolic name (`"Healthy"`), never by ordinal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    Default,
)]
pub enum HealthStatus {
    /// Everything works.
    #[default]
    Healthy,
    /// Functional, with reduced capacity or a failing optional dependency.
    Degraded,
    /// Not able to serve traffic.
    Unhealthy,
}

impl HealthStatus {
    /// Severity rank, higher is worse.
    fn severity(self) -> u8 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }

    /// The worse of two statuses.
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// Status code selection for the health endpoint.
///
/// Configured once when the route is registered and applied independently
/// of how the report body is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultStatusCodes {
    /// Code for [`HealthStatus::Healthy`].
    pub healthy: StatusCode,
    /// Code for [`HealthStatus::Degraded`].
    pub degraded: StatusCode,
    /// Code for [`HealthStatus::Unhealthy`].
    pub unhealthy: StatusCode,
}

impl Default for ResultStatusCodes {
    fn default() -> Self {
        Self {
            healthy: StatusCode::OK,
            degraded: StatusCode::OK,
            unhealthy: StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ResultStatusCodes {
    /// Look up the response code for an overall status.
    pub fn code_for(&self, status: HealthStatus) -> StatusCode {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Degraded => self.degraded,
            HealthStatus::Unhealthy => self.unhealthy,
        }
    }
}
