//! # Gateway Telemetry
//!
//! Logging and metrics for the ledger gateway.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by a `tracing-subscriber` fmt or
//!   JSON layer, filtered by an `EnvFilter`
//! - **Metrics**: Prometheus counters, gauges and histograms in one
//!   process-wide registry, exposed as text by [`encode_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LG_SERVICE_NAME` | `ledger-gateway` | Service name in logs |
//! | `LG_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `LG_JSON_LOGS` | `false` | JSON log lines |
//! | `LG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `LG_METRICS_PORT` | `9100` | Admin listener port |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, LEDGER_RANGE_MAX, LEDGER_RANGE_MIN,
    RPC_REQUESTS, STORAGE_FATAL_ERRORS, STORAGE_OPERATION_DURATION, STORAGE_RETRIES,
    STORAGE_RETRIES_EXHAUSTED, STORAGE_SUBMISSIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics and install the logging subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // Metrics first (synchronous)
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
