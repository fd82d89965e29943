//! Check registration and evaluation.
//!
//! [`HealthChecks`] holds the registered checks, runs them concurrently with a
//! per-check timeout and folds their outcomes into an [`AggregatedReport`].

use std::collections::{BTreeMap, BTreeSet};
use std::future::{ready, Future};
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{HealthError, Result};
use crate::metrics;

use super::report::{AggregatedReport, CheckResult};
use super::status::HealthStatus;

/// Name of the built-in liveness check.
pub const SELF_CHECK: &str = "self";

/// Produces the report served by the health endpoint.
pub trait CheckRunner: Send + Sync {
    /// Evaluate all checks. `None` means checks are disabled.
    fn evaluate(&self) -> BoxFuture<'_, Option<AggregatedReport>>;
}

/// Value returned by a single check.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckResult {
    /// Check status.
    pub status: HealthStatus,
    /// Optional description.
    pub description: Option<String>,
    /// Extra diagnostic values.
    pub data: BTreeMap<String, Value>,
}

impl HealthCheckResult {
    fn with_status(status: HealthStatus, description: Option<String>) -> Self {
        Self {
            status,
            description,
            data: BTreeMap::new(),
        }
    }

    /// A healthy result.
    pub fn healthy() -> Self {
        Self::with_status(HealthStatus::Healthy, None)
    }

    /// A degraded result with a reason.
    pub fn degraded(description: impl Into<String>) -> Self {
        Self::with_status(HealthStatus::Degraded, Some(description.into()))
    }

    /// An unhealthy result with a reason.
    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self::with_status(HealthStatus::Unhealthy, Some(description.into()))
    }

    /// Attach a data value, converting it to JSON.
    pub fn with_data<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Result<Self> {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| HealthError::InvalidData {
            key: key.clone(),
            source,
        })?;
        self.data.insert(key, value);
        Ok(self)
    }
}

/// A probe for one subsystem or dependency.
pub trait HealthCheck: Send + Sync {
    /// Run the probe.
    fn check(&self) -> BoxFuture<'_, HealthCheckResult>;
}

impl<F, Fut> HealthCheck for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = HealthCheckResult> + Send + 'static,
{
    fn check(&self) -> BoxFuture<'_, HealthCheckResult> {
        Box::pin(self())
    }
}

struct Registration {
    name: String,
    tags: BTreeSet<String>,
    check: Box<dyn HealthCheck>,
}

/// Registered checks plus the settings used to evaluate them.
pub struct HealthChecks {
    registrations: Vec<Registration>,
    enabled: bool,
    timeout: std::time::Duration,
}

impl HealthChecks {
    /// Default per-check timeout.
    pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

    /// Create an empty, enabled set of checks.
    pub fn new(timeout: std::time::Duration) -> Self {
        Self {
            registrations: Vec::new(),
            enabled: true,
            timeout,
        }
    }

    /// Build from configuration, with the built-in `self` check registered.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut checks = Self::new(config.health_check_timeout());
        checks.enabled = config.health_checks_enabled;
        checks.add_self_check()?;
        Ok(checks)
    }

    /// Turn evaluation on or off. Disabled checks evaluate to no report.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether checks run on evaluation.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registered check names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.name.as_str()).collect()
    }

    /// Register the `self` check, which always reports healthy.
    pub fn add_self_check(&mut self) -> Result<()> {
        self.add_sync_check(SELF_CHECK, Vec::<String>::new(), HealthCheckResult::healthy)
    }

    /// Register an asynchronous check.
    pub fn add_check<C, I, T>(&mut self, name: impl Into<String>, tags: I, check: C) -> Result<()>
    where
        C: HealthCheck + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(HealthError::InvalidCheckName);
        }
        if self.registrations.iter().any(|r| r.name == name) {
            return Err(HealthError::DuplicateCheck { name });
        }

        debug!(check = %name, "Registered health check");
        self.registrations.push(Registration {
            name,
            tags: tags.into_iter().map(Into::into).collect(),
            check: Box::new(check),
        });
        Ok(())
    }

    /// Register a check that computes its result synchronously.
    pub fn add_sync_check<F, I, T>(&mut self, name: impl Into<String>, tags: I, check: F) -> Result<()>
    where
        F: Fn() -> HealthCheckResult + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.add_check(name, tags, move || ready(check()))
    }

    /// Run every check concurrently and aggregate the results.
    ///
    /// The overall status is the worst entry status, `Healthy` when there are
    /// no checks.
    #[instrument(skip(self), fields(checks = self.registrations.len()))]
    pub async fn run(&self) -> AggregatedReport {
        let started = Instant::now();
        let entries = join_all(self.registrations.iter().map(|r| self.run_one(r))).await;
        let status = entries
            .iter()
            .fold(HealthStatus::Healthy, |overall, entry| overall.worst(entry.status));

        AggregatedReport::new(status, elapsed_since(started), entries)
    }

    async fn run_one(&self, registration: &Registration) -> CheckResult {
        let started = Instant::now();
        // Synchronous checks run inside `check()` itself, so the call has to
        // happen inside the guarded future.
        let probe = AssertUnwindSafe(async { registration.check.check().await }).catch_unwind();

        let outcome = match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                warn!(check = %registration.name, "Health check panicked");
                HealthCheckResult::unhealthy("check panicked")
            }
            Err(_) => {
                warn!(
                    check = %registration.name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Health check timed out"
                );
                HealthCheckResult::unhealthy("check timed out")
            }
        };

        let duration = elapsed_since(started);
        metrics::record_check_latency(&registration.name, duration);
        if outcome.status != HealthStatus::Healthy {
            debug!(
                check = %registration.name,
                status = %outcome.status,
                description = outcome.description.as_deref().unwrap_or(""),
                "Health check not healthy"
            );
        }

        CheckResult {
            name: registration.name.clone(),
            status: outcome.status,
            description: outcome.description,
            duration,
            tags: registration.tags.clone(),
            data: outcome.data,
        }
    }
}

impl CheckRunner for HealthChecks {
    fn evaluate(&self) -> BoxFuture<'_, Option<AggregatedReport>> {
        Box::pin(async move {
            if !self.enabled {
                return None;
            }
            Some(self.run().await)
        })
    }
}

impl Default for HealthChecks {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

fn elapsed_since(started: Instant) -> Duration {
    Duration::try_from(started.elapsed()).unwrap_or(Duration::MAX)
}
