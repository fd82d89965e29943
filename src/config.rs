//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port for the health, status and metrics endpoints.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    // === Health Checks ===
    /// Run registered checks on each request. When off, `/healthz` serves `{}`.
    #[serde(default = "default_true")]
    pub health_checks_enabled: bool,

    /// Per-check timeout in milliseconds.
    #[serde(default = "default_check_timeout_ms")]
    pub health_check_timeout_ms: u64,

    // === Access ===
    /// Bearer token required by the status and metrics endpoints.
    /// `/healthz` never requires it.
    #[serde(default)]
    pub api_token: Option<String>,

    // === Observability ===
    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_check_timeout_ms() -> u64 {
    5_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            health_checks_enabled: default_true(),
            health_check_timeout_ms: default_check_timeout_ms(),
            api_token: None,
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.health_check_timeout_ms == 0 {
            return Err("HEALTH_CHECK_TIMEOUT_MS must be greater than 0".to_string());
        }

        if matches!(&self.api_token, Some(token) if token.trim().is_empty()) {
            return Err("API_TOKEN must not be empty when set".to_string());
        }

        Ok(())
    }

    /// Per-check timeout as a [`Duration`].
    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.health_checks_enabled);
        assert!(config.metrics_enabled);
        assert_eq!(config.health_check_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = Config {
            health_check_timeout_ms: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_api_token() {
        let config = Config {
            api_token: Some("  ".to_string()),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn envy_reads_uppercase_variables() {
        let vars = vec![
            ("PORT".to_string(), "9090".to_string()),
            ("HEALTH_CHECKS_ENABLED".to_string(), "false".to_string()),
            ("API_TOKEN".to_string(), "secret".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 9090);
        assert!(!config.health_checks_enabled);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.health_check_timeout_ms, 5_000);
    }
}
