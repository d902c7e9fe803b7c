//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `info,lg_01_storage_executor=debug`
    pub log_level: String,

    /// Whether to write log lines to stdout at all
    pub console_output: bool,

    /// Whether log lines are JSON formatted
    pub json_logs: bool,

    /// Port of the admin listener serving `/metrics`
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ledger-gateway".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LG_SERVICE_NAME`: Service name (default: ledger-gateway)
    /// - `LG_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `LG_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `LG_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `LG_METRICS_PORT`: Admin/metrics port (default: 9100)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    /// Build from an arbitrary key lookup. `from_env` is this over the
    /// process environment.
    pub fn from_lookup<F>(lookup: F, is_container: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            service_name: lookup("LG_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("LG_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("LG_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("LG_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            metrics_port: lookup("LG_METRICS_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metrics_port),
        }
    }
}
