//! Projection of an aggregated report into the stable wire document.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use time::Duration;

use super::duration::canonical;
use super::identity::IdentityCache;
use super::report::{AggregatedReport, CheckResult};
use super::status::HealthStatus;

/// Document handed to the serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum HealthDocument<'a> {
    /// No report was available; written as `{}`.
    Empty,
    /// A projected report.
    Report(ReportDocument<'a>),
}

/// Top-level report document. Field names are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument<'a> {
    pub status: HealthStatus,
    #[serde(with = "canonical")]
    pub total_duration: Duration,
    pub assembly: &'a str,
    pub assemblies: &'a [String],
    pub entries: Vec<EntryDocument<'a>>,
}

/// One check inside a [`ReportDocument`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument<'a> {
    pub name: &'a str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(with = "canonical")]
    pub duration: Duration,
    pub tags: &'a BTreeSet<String>,
    pub data: &'a BTreeMap<String, Value>,
}

impl<'a> From<&'a CheckResult> for EntryDocument<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            name: &result.name,
            status: result.status,
            description: result.description.as_deref(),
            duration: result.duration,
            tags: &result.tags,
            data: &result.data,
        }
    }
}

/// Project a report, or its absence, into a document.
///
/// Entries keep the order of the report. The identity snapshot is attached
/// as-is and is only taken once a report is actually present.
pub fn project<'a>(
    report: Option<&'a AggregatedReport>,
    identity: &'a IdentityCache,
) -> HealthDocument<'a> {
    let Some(report) = report else {
        return HealthDocument::Empty;
    };
    let identity = identity.get();

    HealthDocument::Report(ReportDocument {
        status: report.status,
        total_duration: report.total_duration,
        assembly: &identity.assembly,
        assemblies: &identity.assemblies,
        entries: report.entries.iter().map(EntryDocument::from).collect(),
    })
}
