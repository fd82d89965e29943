//! Writes health reports into HTTP responses.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;

use crate::error::Result;

use super::identity::{process_identity, IdentityCache};
use super::projector::project;
use super::report::AggregatedReport;
use super::serializer::{to_bytes, CONTENT_TYPE};

/// Response writer for the health endpoint.
///
/// Only the body and content type are written; the status code belongs to
/// the route.
#[derive(Debug, Clone)]
pub struct HealthResponseWriter {
    identity: Arc<IdentityCache>,
}

impl HealthResponseWriter {
    /// Create a writer that attaches identities from `identity`.
    pub fn new(identity: Arc<IdentityCache>) -> Self {
        Self { identity }
    }

    /// The identity cache used by this writer.
    pub fn identity(&self) -> &IdentityCache {
        &self.identity
    }

    /// Project and serialize a report without touching a response.
    pub fn render(&self, report: Option<&AggregatedReport>) -> Result<Vec<u8>> {
        to_bytes(&project(report, &self.identity))
    }

    /// Write the report, or `{}` when there is none, as the response body.
    pub fn write(&self, response: &mut Response, report: Option<&AggregatedReport>) -> Result<()> {
        let body = self.render(report)?;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));
        *response.body_mut() = Body::from(body);
        Ok(())
    }
}

impl Default for HealthResponseWriter {
    fn default() -> Self {
        Self::new(process_identity())
    }
}
