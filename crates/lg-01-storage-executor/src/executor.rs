//! # Async Executor
//!
//! Drives one logical storage operation from first submission to a single
//! delivered result.
//!
//! Each operation runs in its own spawned task which owns the attempt state
//! (descriptor, attempt counter, policy) until completion. Connection
//! callbacks arrive on foreign threads and are bridged back into the task with
//! one `oneshot` channel per attempt, so no runtime worker ever blocks.
//!
//! Flow for [`AsyncExecutor::execute`]:
//! 1. Caller hands over the [`Operation`] and awaits a receiver
//! 2. The spawned task submits, awaits the bridge, classifies the result
//! 3. Transient failures go to the policy: resubmit after a delay, or give up
//! 4. The task delivers exactly one result; dropping the caller's future does
//!    not cancel the task

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify, Semaphore};
use tracing::{debug, info, instrument, warn, Span};

use gateway_telemetry::{
    HistogramTimer, STORAGE_FATAL_ERRORS, STORAGE_OPERATION_DURATION, STORAGE_RETRIES,
    STORAGE_RETRIES_EXHAUSTED, STORAGE_SUBMISSIONS,
};
use shared_types::NodeMode;

use crate::domain::errors::{ConfigError, StorageError};
use crate::domain::operation::{Operation, OperationClass, ResultSet};
use crate::domain::outcome::{classify, ErrorCode, Outcome, StorageFailure};
use crate::domain::retry::{RetryConfig, RetryDecision, RetryPolicyFactory};
use crate::ports::outbound::StorageConnection;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Retry policy used for every operation
    pub retry: RetryConfig,
    /// Read submissions allowed in flight at once
    pub max_read_requests_outstanding: usize,
    /// Write submissions allowed in flight at once
    pub max_write_requests_outstanding: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            max_read_requests_outstanding: 100_000,
            max_write_requests_outstanding: 10_000,
        }
    }
}

impl ExecutorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate()?;
        if self.max_read_requests_outstanding == 0 {
            return Err(ConfigError::InvalidValue {
                field: "executor.max_read_requests_outstanding",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_write_requests_outstanding == 0 {
            return Err(ConfigError::InvalidValue {
                field: "executor.max_write_requests_outstanding",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counters for the executor
#[derive(Debug, Default)]
pub struct ExecutorStats {
    /// Operations accepted and spawned
    pub operations_started: AtomicU64,
    /// Operations delivered with a result set
    pub operations_succeeded: AtomicU64,
    /// Operations delivered with an error
    pub operations_failed: AtomicU64,
    /// Submissions handed to the connection
    pub submissions: AtomicU64,
    /// Resubmissions after a transient failure
    pub retries: AtomicU64,
    /// Operations refused without a submission (draining or read-only)
    pub rejected: AtomicU64,
}

/// Point-in-time copy of [`ExecutorStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExecutorStatsSnapshot {
    pub operations_started: u64,
    pub operations_succeeded: u64,
    pub operations_failed: u64,
    pub submissions: u64,
    pub retries: u64,
    pub rejected: u64,
}

impl ExecutorStats {
    pub fn snapshot(&self) -> ExecutorStatsSnapshot {
        ExecutorStatsSnapshot {
            operations_started: self.operations_started.load(Ordering::Relaxed),
            operations_succeeded: self.operations_succeeded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            submissions: self.submissions.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// EXECUTOR
// =============================================================================

struct ExecutorInner {
    connection: Arc<dyn StorageConnection>,
    policies: Arc<dyn RetryPolicyFactory>,
    mode: NodeMode,
    read_slots: Semaphore,
    write_slots: Semaphore,
    accepting: AtomicBool,
    in_flight: AtomicUsize,
    idle: Notify,
    stats: ExecutorStats,
}

/// Asynchronous executor with per-operation retry.
///
/// Cheap to clone; clones share the connection, limits and in-flight set.
/// `run` and `execute` must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct AsyncExecutor {
    inner: Arc<ExecutorInner>,
}

impl AsyncExecutor {
    /// Executor whose policies are built from `config.retry`.
    pub fn new(
        connection: Arc<dyn StorageConnection>,
        config: ExecutorConfig,
        mode: NodeMode,
    ) -> Self {
        let policies: Arc<dyn RetryPolicyFactory> = Arc::new(config.retry.clone());
        Self::with_policy_factory(connection, policies, &config, mode)
    }

    /// Executor with a caller-supplied policy factory. The `retry` section of
    /// `config` is ignored.
    pub fn with_policy_factory(
        connection: Arc<dyn StorageConnection>,
        policies: Arc<dyn RetryPolicyFactory>,
        config: &ExecutorConfig,
        mode: NodeMode,
    ) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                connection,
                policies,
                mode,
                read_slots: Semaphore::new(config.max_read_requests_outstanding),
                write_slots: Semaphore::new(config.max_write_requests_outstanding),
                accepting: AtomicBool::new(true),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                stats: ExecutorStats::default(),
            }),
        }
    }

    pub fn mode(&self) -> NodeMode {
        self.inner.mode
    }

    /// Start `operation` and return immediately.
    ///
    /// `on_complete` fires exactly once: with the result set, the fatal
    /// error, or the last transient error once the policy gives up.
    /// Write-class operations on a read-only executor, and any operation
    /// after [`drain`](Self::drain) started, complete at once with a fatal
    /// error and never reach the connection.
    pub fn run<F>(&self, operation: Operation, on_complete: F)
    where
        F: FnOnce(Result<ResultSet, StorageError>) + Send + 'static,
    {
        let inner = &self.inner;

        if operation.class() == OperationClass::Write && inner.mode.is_read_only() {
            inner.stats.rejected.fetch_add(1, Ordering::Relaxed);
            STORAGE_FATAL_ERRORS
                .with_label_values(&[ErrorCode::ReadOnly.as_str()])
                .inc();
            debug!(query = %operation.query(), "Rejected write on read-only node");
            on_complete(Err(StorageError::fatal(
                ErrorCode::ReadOnly,
                format!("{} rejected: node is read-only", operation.query()),
            )));
            return;
        }

        let Some(guard) = InFlightGuard::enter(inner) else {
            inner.stats.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(query = %operation.query(), "Rejected operation while draining");
            on_complete(Err(StorageError::fatal(
                ErrorCode::ShuttingDown,
                "executor is draining",
            )));
            return;
        };

        inner.stats.operations_started.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            let result = inner.drive(operation).await;
            match &result {
                Ok(_) => inner.stats.operations_succeeded.fetch_add(1, Ordering::Relaxed),
                Err(_) => inner.stats.operations_failed.fetch_add(1, Ordering::Relaxed),
            };
            on_complete(result);
            drop(guard);
        });
    }

    /// Run `operation` and await its single result.
    ///
    /// Dropping the returned future stops waiting but does not cancel the
    /// attempt sequence.
    pub async fn execute(&self, operation: Operation) -> Result<ResultSet, StorageError> {
        let (tx, rx) = oneshot::channel();
        self.run(operation, move |result| {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(result);
        });
        rx.await.unwrap_or_else(|_| {
            Err(StorageError::fatal(
                ErrorCode::Internal,
                "executor task ended without delivering a result",
            ))
        })
    }

    /// Stop accepting operations and wait until every in-flight one has
    /// delivered its completion.
    pub async fn drain(&self) {
        let inner = &self.inner;
        inner.accepting.store(false, Ordering::SeqCst);

        loop {
            let notified = inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let remaining = inner.in_flight.load(Ordering::SeqCst);
            if remaining == 0 {
                break;
            }
            debug!(remaining, "Waiting for in-flight storage operations");
            notified.await;
        }

        info!("Storage executor drained");
    }

    pub fn is_accepting(&self) -> bool {
        self.inner.accepting.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &ExecutorStats {
        &self.inner.stats
    }
}

impl ExecutorInner {
    #[instrument(
        name = "storage_operation",
        skip_all,
        fields(query = %operation.query(), attempts = tracing::field::Empty)
    )]
    async fn drive(&self, operation: Operation) -> Result<ResultSet, StorageError> {
        let _timer = HistogramTimer::new(&STORAGE_OPERATION_DURATION);
        let operation = Arc::new(operation);
        let policy = self.policies.create();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let raw = self.submit_once(&operation).await;

            match classify(raw) {
                Outcome::Success(rows) => {
                    Span::current().record("attempts", attempt);
                    if attempt > 1 {
                        debug!(attempt, "Storage operation succeeded after retry");
                    }
                    return Ok(rows);
                }
                Outcome::Fatal(failure) => {
                    Span::current().record("attempts", attempt);
                    STORAGE_FATAL_ERRORS
                        .with_label_values(&[failure.code.as_str()])
                        .inc();
                    warn!(
                        attempt,
                        code = %failure.code,
                        error = %failure.message,
                        "Storage operation failed"
                    );
                    return Err(failure.into());
                }
                Outcome::Transient(failure) => match policy.decide(failure.code, attempt) {
                    RetryDecision::RetryAfter(delay) => {
                        self.stats.retries.fetch_add(1, Ordering::Relaxed);
                        STORAGE_RETRIES
                            .with_label_values(&[failure.code.as_str()])
                            .inc();
                        gateway_telemetry::log_storage_event!(
                            debug,
                            operation.query(),
                            attempt,
                            "Transient storage failure, retrying",
                            code = %failure.code,
                            delay_ms = delay.as_millis() as u64
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                    RetryDecision::GiveUp => {
                        Span::current().record("attempts", attempt);
                        STORAGE_RETRIES_EXHAUSTED.inc();
                        warn!(
                            attempt,
                            max_attempts = policy.max_attempts(),
                            code = %failure.code,
                            error = %failure.message,
                            "Storage operation gave up after transient failures"
                        );
                        return Err(StorageError::exhausted(failure, attempt));
                    }
                },
            }
        }
    }

    /// One submission, bridged back into the task.
    async fn submit_once(&self, operation: &Arc<Operation>) -> Result<ResultSet, StorageFailure> {
        let class = operation.class();
        let slots = match class {
            OperationClass::Read => &self.read_slots,
            OperationClass::Write => &self.write_slots,
        };
        // The semaphores are never closed.
        let _permit = slots.acquire().await.map_err(|_| {
            StorageFailure::new(ErrorCode::Internal, "submission limiter closed")
        })?;

        self.stats.submissions.fetch_add(1, Ordering::Relaxed);
        STORAGE_SUBMISSIONS.with_label_values(&[class.as_str()]).inc();

        let (tx, rx) = oneshot::channel();
        self.connection.submit(
            Arc::clone(operation),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );

        rx.await.unwrap_or_else(|_| {
            Err(StorageFailure::new(
                ErrorCode::Internal,
                format!(
                    "connection dropped the completion for {} without invoking it",
                    operation.query()
                ),
            ))
        })
    }
}

/// Counts one operation as in flight for [`AsyncExecutor::drain`].
struct InFlightGuard {
    inner: Arc<ExecutorInner>,
}

impl InFlightGuard {
    fn enter(inner: &Arc<ExecutorInner>) -> Option<Self> {
        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = Self {
            inner: Arc::clone(inner),
        };
        // Increment first: a concurrent drain either sees this operation or
        // we see the flag.
        if inner.accepting.load(Ordering::SeqCst) {
            Some(guard)
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
