//! Subscriber setup for structured logging.
//!
//! JSON lines carry `timestamp`, `level`, `target`, the message and every
//! structured field recorded at the call site (`query`, `attempt`,
//! `sequence`, ...), so a log shipper can index them without parsing text.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level '{}': {}", config.log_level, e)))?;

    if !config.console_output {
        return tracing_subscriber::registry()
            .with(env_filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggerInit(e.to_string()));
    }

    if config.json_logs {
        // JSON output for containers/production
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggerInit(e.to_string()))
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggerInit(e.to_string()))
    }
}

/// Log a storage-operation event with the standard fields.
#[macro_export]
macro_rules! log_storage_event {
    ($level:ident, $query:expr, $attempt:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            query = %$query,
            attempt = $attempt,
            $($($field)*,)?
            $msg
        )
    };
}
