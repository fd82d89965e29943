//! JSON encoding of health documents.

use std::io::Write;

use crate::error::Result;

use super::projector::HealthDocument;

/// Body written when no report is available.
pub const EMPTY_DOCUMENT: &[u8] = b"{}";

/// Content type of every health response.
pub const CONTENT_TYPE: &str = "application/json";

/// Encode a document as compact JSON.
///
/// The document is encoded completely before it is returned, so a failure
/// never leaves truncated output behind.
pub fn to_bytes(document: &HealthDocument<'_>) -> Result<Vec<u8>> {
    match document {
        HealthDocument::Empty => Ok(EMPTY_DOCUMENT.to_vec()),
        HealthDocument::Report(report) => Ok(serde_json::to_vec(report)?),
    }
}

/// Encode a document and write it to `writer` in one go.
pub fn write_document<W: Write>(writer: &mut W, document: &HealthDocument<'_>) -> Result<()> {
    let bytes = to_bytes(document)?;
    writer.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::identity::{ComponentRegistry, IdentityCache};
    use crate::health::projector::project;
    use crate::health::report::{AggregatedReport, CheckResult};
    use crate::health::status::HealthStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use time::Duration;

    fn identity() -> IdentityCache {
        let registry = ComponentRegistry::new(Some("MyService, Version=1.0.0.0".to_string()));
        registry.register("MyService");
        registry.register("Core.Lib");
        IdentityCache::new(Arc::new(registry))
    }

    #[test]
    fn empty_document_is_two_bytes() {
        assert_eq!(to_bytes(&HealthDocument::Empty).unwrap(), b"{}".to_vec());
    }

    #[test]
    fn report_matches_wire_contract() {
        let identity = identity();
        let report = AggregatedReport::new(
            HealthStatus::Healthy,
            Duration::nanoseconds(1_234_500),
            vec![CheckResult::new("self", HealthStatus::Healthy, Duration::microseconds(1))],
        );

        let bytes = to_bytes(&project(Some(&report), &identity)).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            concat!(
                r#"{"status":"Healthy","totalDuration":"00:00:00.0012345","#,
                r#""assembly":"MyService, Version=1.0.0.0","assemblies":["MyService","Core.Lib"],"#,
                r#""entries":[{"name":"self","status":"Healthy","duration":"00:00:00.0000010","#,
                r#""tags":[],"data":{}}]}"#
            )
        );
    }

    #[test]
    fn description_is_omitted_only_when_absent() {
        let identity = identity();
        let report = AggregatedReport::new(
            HealthStatus::Unhealthy,
            Duration::ZERO,
            vec![
                CheckResult::new("quiet", HealthStatus::Healthy, Duration::ZERO),
                CheckResult::new("loud", HealthStatus::Unhealthy, Duration::ZERO)
                    .with_description("connection refused"),
            ],
        );

        let bytes = to_bytes(&project(Some(&report), &identity)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value["entries"][0].get("description").is_none());
        assert_eq!(value["entries"][1]["description"], json!("connection refused"));
        assert!(!String::from_utf8(bytes).unwrap().contains("null"));
    }

    #[test]
    fn tags_and_data_are_written_with_content() {
        let identity = identity();
        let report = AggregatedReport::new(
            HealthStatus::Degraded,
            Duration::ZERO,
            vec![CheckResult::new("db", HealthStatus::Degraded, Duration::seconds(2))
                .with_tag("storage")
                .with_tag("critical")
                .with_data("replicas", json!({ "up": 1, "down": 2 }))
                .unwrap()],
        );

        let bytes = to_bytes(&project(Some(&report), &identity)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["status"], json!("Degraded"));
        assert_eq!(value["entries"][0]["duration"], json!("00:00:02"));
        assert_eq!(value["entries"][0]["tags"], json!(["critical", "storage"]));
        assert_eq!(value["entries"][0]["data"], json!({ "replicas": { "up": 1, "down": 2 } }));
    }

    #[test]
    fn write_document_writes_whole_body() {
        let mut out = Vec::new();
        write_document(&mut out, &HealthDocument::Empty).unwrap();
        assert_eq!(out, b"{}");
    }
}
