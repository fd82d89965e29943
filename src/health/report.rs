//! Check results and the aggregated report produced by the check runner.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use time::Duration;

use crate::error::{HealthError, Result};

use super::status::HealthStatus;

/// Outcome of a single named check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Registered check name, unique within a report.
    pub name: String,
    /// Check status.
    pub status: HealthStatus,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Time spent running the check.
    pub duration: Duration,
    /// Tags attached at registration.
    pub tags: BTreeSet<String>,
    /// Extra diagnostic values reported by the check.
    pub data: BTreeMap<String, Value>,
}

impl CheckResult {
    /// Create a result with no description, tags or data.
    pub fn new(name: impl Into<String>, status: HealthStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            description: None,
            duration,
            tags: BTreeSet::new(),
            data: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach a data value, converting it to JSON up front.
    ///
    /// Values that have no JSON form (maps with non-string keys, a failing
    /// `Serialize` impl) are rejected here so they can never break a report
    /// later on.
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

/// Snapshot of every registered check for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedReport {
    /// Overall status, derived by whoever built the report.
    pub status: HealthStatus,
    /// Wall time for the whole evaluation.
    pub total_duration: Duration,
    /// Results in registration order.
    pub entries: Vec<CheckResult>,
}

impl AggregatedReport {
    /// Assemble a report from precomputed parts.
    pub fn new(status: HealthStatus, total_duration: Duration, entries: Vec<CheckResult>) -> Self {
        Self {
            status,
            total_duration,
            entries,
        }
    }

    /// Look up an entry by check name.
    pub fn entry(&self, name: &str) -> Option<&CheckResult> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
