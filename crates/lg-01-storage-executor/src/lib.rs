//! # Storage Executor (lg-01)
//!
//! Issues storage operations against a multi-node cluster, classifies every
//! completion and retries transient failures according to a per-operation
//! policy.
//!
//! ## Architecture
//!
//! ```text
//!  caller ──Operation──→ AsyncExecutor ──submit──→ StorageConnection
//!                          │      ↑                      │
//!                          │      └────oneshot bridge────┘ (completion thread)
//!                          ↓
//!                      classify ──→ Success ──────────────→ deliver
//!                          │    ──→ Fatal ────────────────→ deliver
//!                          └────→ Transient ──→ RetryPolicy
//!                                                 ├─ RetryAfter(d) → sleep, resubmit
//!                                                 └─ GiveUp ───────→ deliver last error
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Single completion | `on_complete` fires exactly once per operation |
//! | Serialized attempts | one submission in flight per operation at a time |
//! | Fatal is final | fatal classifications are never retried |
//! | Last error wins | an exhausted policy surfaces the last real failure |
//! | Bounded retries | every policy declares a finite attempt bound |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Operation descriptor, outcome classification, retry policies
//! - `ports/` - The storage connection port
//! - `executor.rs` - The async executor
//! - `adapters/` - In-process simulated cluster and fault injection
//!
//! ## Usage
//!
//! ```ignore
//! use lg_01_storage_executor::{AsyncExecutor, ExecutorConfig, InMemoryCluster, Operation, Query};
//!
//! let cluster = Arc::new(InMemoryCluster::new(ClusterConfig::default())?);
//! let executor = AsyncExecutor::new(cluster, ExecutorConfig::default(), NodeMode::ReadWrite);
//! let rows = executor.execute(Operation::new(Query::SelectLedgerRange, vec![])).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod executor;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::faulty::{Fault, FaultyConnection};
pub use adapters::memory::{ClusterConfig, InMemoryCluster, NodeHealth};
pub use domain::errors::{ConfigError, StorageError};
pub use domain::operation::{Operation, OperationClass, Query, ResultSet, Row, RowError, Value};
pub use domain::outcome::{classify, ErrorCode, Outcome, StorageFailure};
pub use domain::retry::{
    DefaultRetryPolicy, ExponentialBackoffPolicy, NeverRetry, RetryConfig, RetryDecision,
    RetryPolicy, RetryPolicyFactory, RetryStrategy, TimeBudget,
};
pub use executor::{AsyncExecutor, ExecutorConfig, ExecutorStats, ExecutorStatsSnapshot};
pub use ports::outbound::{Completion, StorageConnection};
