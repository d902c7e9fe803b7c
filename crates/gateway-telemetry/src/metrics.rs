//! Prometheus metrics for the ledger gateway.
//!
//! All metrics follow the naming convention: `lg_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., storage_submissions_total)
//! - **Gauge**: Value that can go up or down (e.g., ledger_range_max)
//! - **Histogram**: Distribution of values (e.g., storage_operation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Once;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // STORAGE EXECUTOR METRICS
    // =========================================================================

    /// Submissions handed to the storage connection, by operation class
    pub static ref STORAGE_SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("lg_storage_submissions_total", "Submissions sent to the storage cluster"),
        &["class"]  // read/write
    ).expect("metric creation failed");

    /// Resubmissions after a transient failure, by failure kind
    pub static ref STORAGE_RETRIES: CounterVec = CounterVec::new(
        Opts::new("lg_storage_retries_total", "Storage operations resubmitted after a transient failure"),
        &["kind"]
    ).expect("metric creation failed");

    /// Operations whose retry policy gave up
    pub static ref STORAGE_RETRIES_EXHAUSTED: Counter = Counter::new(
        "lg_storage_retries_exhausted_total",
        "Storage operations that failed after the retry policy gave up"
    ).expect("metric creation failed");

    /// Operations that failed with a non-retryable error
    pub static ref STORAGE_FATAL_ERRORS: CounterVec = CounterVec::new(
        Opts::new("lg_storage_fatal_errors_total", "Storage operations failed with a fatal error"),
        &["kind"]
    ).expect("metric creation failed");

    /// Wall time from first submission to delivered completion
    pub static ref STORAGE_OPERATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "lg_storage_operation_duration_seconds",
            "Time from first submission to completion, retries included"
        ).buckets(exponential_buckets(0.0001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER RANGE METRICS
    // =========================================================================

    /// Lowest sequence of the published ledger range
    pub static ref LEDGER_RANGE_MIN: Gauge = Gauge::new(
        "lg_ledger_range_min",
        "Lowest ledger sequence in the published range"
    ).expect("metric creation failed");

    /// Highest sequence of the published ledger range
    pub static ref LEDGER_RANGE_MAX: Gauge = Gauge::new(
        "lg_ledger_range_max",
        "Highest ledger sequence in the published range"
    ).expect("metric creation failed");

    // =========================================================================
    // RPC METRICS
    // =========================================================================

    /// RPC requests by method and outcome
    pub static ref RPC_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("lg_rpc_requests_total", "RPC requests handled"),
        &["method", "outcome"]  // outcome: success/error
    ).expect("metric creation failed");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Safe to call more than once; only the first call registers.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let mut result = Ok(());
    REGISTER.call_once(|| {
        let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
            // Storage
            Box::new(STORAGE_SUBMISSIONS.clone()),
            Box::new(STORAGE_RETRIES.clone()),
            Box::new(STORAGE_RETRIES_EXHAUSTED.clone()),
            Box::new(STORAGE_FATAL_ERRORS.clone()),
            Box::new(STORAGE_OPERATION_DURATION.clone()),
            // Range
            Box::new(LEDGER_RANGE_MIN.clone()),
            Box::new(LEDGER_RANGE_MAX.clone()),
            // RPC
            Box::new(RPC_REQUESTS.clone()),
        ];

        for metric in metrics {
            if let Err(e) = REGISTRY.register(metric) {
                result = Err(TelemetryError::MetricsInit(e.to_string()));
                return;
            }
        }
    });
    result
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
