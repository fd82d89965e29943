//! Unified error types for the health reporting service.

use thiserror::Error;

/// Unified error type for the health reporting service.
#[derive(Error, Debug)]
pub enum HealthError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration was loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The projected document could not be encoded.
    ///
    /// This is the only failure that aborts a health request. No partial body
    /// is ever written when it occurs.
    #[error("failed to serialize health report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A check was registered with an empty name.
    #[error("health check name must not be empty")]
    InvalidCheckName,

    /// A check with the same name is already registered.
    #[error("health check {name} is already registered")]
    DuplicateCheck {
        /// The conflicting check name.
        name: String,
    },

    /// A value attached to a check result could not be represented as JSON.
    #[error("data entry {key} cannot be represented as JSON: {source}")]
    InvalidData {
        /// Key of the rejected data entry.
        key: String,
        /// Underlying conversion failure.
        #[source]
        source: serde_json::Error,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, HealthError>;
