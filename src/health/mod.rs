//! Health report pipeline.
//!
//! ```text
//! HealthChecks (runner.rs)
//!     → AggregatedReport (report.rs)
//!     → project() (projector.rs), identity from identity.rs
//!     → to_bytes() (serializer.rs), durations via duration.rs
//!     → HealthResponseWriter (writer.rs) → response body
//!
//! ResultStatusCodes (status.rs) → response status, applied by the route
//! ```

pub mod duration;
pub mod identity;
pub mod projector;
pub mod report;
pub mod runner;
pub mod serializer;
pub mod status;
pub mod writer;

pub use identity::{process_identity, ComponentRegistry, IdentityCache, ProcessIdentity};
pub use projector::{project, HealthDocument};
pub use report::{AggregatedReport, CheckResult};
pub use runner::{CheckRunner, HealthCheck, HealthCheckResult, HealthChecks};
pub use status::{HealthStatus, ResultStatusCodes};
pub use writer::HealthResponseWriter;
