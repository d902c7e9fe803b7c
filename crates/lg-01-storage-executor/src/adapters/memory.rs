//! # In-Memory Cluster
//!
//! A simulated multi-node storage cluster behind [`StorageConnection`].
//!
//! ```text
//! submit ──round-robin──→ node[i] ──health──┬─ Up   → apply to shared tables
//!                                           ├─ Down → NodeUnavailable
//!                                           └─ Slow → RequestTimedOut
//!                  (completion always runs on the rayon pool)
//! ```
//!
//! Tables:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | transactions | hash | tx blob, metadata blob, sequence, date |
//! | objects | (key, sequence) | blob (empty = deleted) |
//! | ledgers | sequence | header blob |
//! | ledger_range | is_latest | sequence |
//!
//! `ledger_range` has at most two rows: `is_latest = false` holds the lowest
//! sequence, `is_latest = true` the highest.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::ConfigError;
use crate::domain::operation::{Operation, Query, ResultSet, Row, Value};
use crate::domain::outcome::{ErrorCode, StorageFailure};
use crate::ports::outbound::{Completion, StorageConnection};

/// Simulated cluster shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of simulated nodes
    pub nodes: usize,
    /// Threads completing submissions
    pub worker_threads: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: 3,
            worker_threads: 2,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.nodes",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.worker_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Health of one simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeHealth {
    #[default]
    Up,
    /// Fails every submission with `NodeUnavailable`.
    Down,
    /// Fails every submission with `RequestTimedOut`.
    Slow,
}

#[derive(Debug, Clone)]
struct TransactionRow {
    transaction: Vec<u8>,
    metadata: Vec<u8>,
    sequence: u64,
    date: u64,
}

#[derive(Debug, Default)]
struct Tables {
    transactions: HashMap<Vec<u8>, TransactionRow>,
    objects: HashMap<Vec<u8>, BTreeMap<u64, Vec<u8>>>,
    ledgers: BTreeMap<u64, Vec<u8>>,
    /// Index 0: `is_latest = false`, index 1: `is_latest = true`
    ledger_range: [Option<u64>; 2],
}

/// Simulated cluster. Clone the `Arc` to share one dataset between several
/// executors (e.g. a writer node and a read-only node).
pub struct InMemoryCluster {
    tables: Arc<RwLock<Tables>>,
    nodes: Vec<RwLock<NodeHealth>>,
    next_node: AtomicUsize,
    pool: rayon::ThreadPool,
}

impl InMemoryCluster {
    pub fn new(config: ClusterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("cluster-completion-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

        Ok(Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            nodes: (0..config.nodes)
                .map(|_| RwLock::new(NodeHealth::Up))
                .collect(),
            next_node: AtomicUsize::new(0),
            pool,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Change the health of node `index`. Out-of-range indices are ignored.
    pub fn set_node_health(&self, index: usize, health: NodeHealth) {
        if let Some(node) = self.nodes.get(index) {
            *node.write() = health;
            debug!(node = index, ?health, "Simulated node health changed");
        }
    }

    pub fn set_all_health(&self, health: NodeHealth) {
        for index in 0..self.nodes.len() {
            self.set_node_health(index, health);
        }
    }

    fn pick_node(&self) -> (usize, NodeHealth) {
        let index = self.next_node.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        (index, *self.nodes[index].read())
    }
}

impl StorageConnection for InMemoryCluster {
    fn submit(&self, operation: Arc<Operation>, completion: Completion) {
        let (node, health) = self.pick_node();
        let tables = Arc::clone(&self.tables);

        self.pool.spawn(move || {
            let result = match health {
                NodeHealth::Up => apply(&tables, &operation),
                NodeHealth::Down => Err(StorageFailure::new(
                    ErrorCode::NodeUnavailable,
                    format!("node {node} is unavailable"),
                )),
                NodeHealth::Slow => Err(StorageFailure::new(
                    ErrorCode::RequestTimedOut,
                    format!("node {node} did not answer in time"),
                )),
            };
            completion(result);
        });
    }
}

// =============================================================================
// STATEMENT EVALUATION
// =============================================================================

fn invalid(operation: &Operation, reason: impl std::fmt::Display) -> StorageFailure {
    StorageFailure::new(
        ErrorCode::InvalidQuery,
        format!("{}: {}", operation.query(), reason),
    )
}

fn blob_at(operation: &Operation, index: usize) -> Result<Vec<u8>, StorageFailure> {
    match operation.params().get(index) {
        Some(Value::Blob(b)) => Ok(b.clone()),
        _ => Err(invalid(operation, format!("parameter {index} must be a blob"))),
    }
}

fn int_at(operation: &Operation, index: usize) -> Result<u64, StorageFailure> {
    match operation.params().get(index) {
        Some(Value::Int(v)) => Ok(*v),
        _ => Err(invalid(operation, format!("parameter {index} must be an int"))),
    }
}

fn bool_at(operation: &Operation, index: usize) -> Result<bool, StorageFailure> {
    match operation.params().get(index) {
        Some(Value::Bool(v)) => Ok(*v),
        _ => Err(invalid(operation, format!("parameter {index} must be a bool"))),
    }
}

fn apply(tables: &RwLock<Tables>, operation: &Operation) -> Result<ResultSet, StorageFailure> {
    let query = operation.query();
    if operation.params().len() != query.arity() {
        return Err(invalid(
            operation,
            format!(
                "expected {} parameters, got {}",
                query.arity(),
                operation.params().len()
            ),
        ));
    }

    match query {
        Query::SelectTransaction => {
            let hash = blob_at(operation, 0)?;
            let tables = tables.read();
            let rows = tables
                .transactions
                .get(&hash)
                .map(|row| {
                    vec![Row::new(vec![
                        Value::Blob(row.transaction.clone()),
                        Value::Blob(row.metadata.clone()),
                        Value::Int(row.sequence),
                        Value::Int(row.date),
                    ])]
                })
                .unwrap_or_default();
            Ok(ResultSet::from_rows(rows))
        }
        Query::InsertTransaction => {
            let row = TransactionRow {
                transaction: blob_at(operation, 1)?,
                metadata: blob_at(operation, 2)?,
                sequence: int_at(operation, 3)?,
                date: int_at(operation, 4)?,
            };
            let hash = blob_at(operation, 0)?;
            tables.write().transactions.insert(hash, row);
            Ok(ResultSet::empty())
        }
        Query::SelectEntry => {
            let key = blob_at(operation, 0)?;
            let sequence = int_at(operation, 1)?;
            let tables = tables.read();
            let rows = tables
                .objects
                .get(&key)
                .and_then(|versions| versions.range(..=sequence).next_back())
                .map(|(seq, blob)| vec![Row::new(vec![Value::Int(*seq), Value::Blob(blob.clone())])])
                .unwrap_or_default();
            Ok(ResultSet::from_rows(rows))
        }
        Query::InsertEntry => {
            let key = blob_at(operation, 0)?;
            let sequence = int_at(operation, 1)?;
            let blob = blob_at(operation, 2)?;
            tables
                .write()
                .objects
                .entry(key)
                .or_default()
                .insert(sequence, blob);
            Ok(ResultSet::empty())
        }
        Query::SelectLedgerHeader => {
            let sequence = int_at(operation, 0)?;
            let tables = tables.read();
            let rows = tables
                .ledgers
                .get(&sequence)
                .map(|blob| vec![Row::new(vec![Value::Blob(blob.clone())])])
                .unwrap_or_default();
            Ok(ResultSet::from_rows(rows))
        }
        Query::InsertLedgerHeader => {
            let sequence = int_at(operation, 0)?;
            let blob = blob_at(operation, 1)?;
            tables.write().ledgers.insert(sequence, blob);
            Ok(ResultSet::empty())
        }
        Query::SelectLedgerRange => {
            let tables = tables.read();
            let rows = [false, true]
                .into_iter()
                .zip(tables.ledger_range)
                .filter_map(|(is_latest, seq)| {
                    seq.map(|s| Row::new(vec![Value::Bool(is_latest), Value::Int(s)]))
                })
                .collect();
            Ok(ResultSet::from_rows(rows))
        }
        Query::InitLedgerRange => {
            let sequence = int_at(operation, 0)?;
            let mut tables = tables.write();
            let current = tables.ledger_range;
            match current {
                [Some(min), Some(max)] if min == sequence && max == sequence => {
                    Ok(ResultSet::empty())
                }
                // A lone minimum row is an interrupted initialisation
                [_, None] => {
                    tables.ledger_range = [Some(sequence), Some(sequence)];
                    Ok(ResultSet::empty())
                }
                _ => Ok(ResultSet::not_applied()),
            }
        }
        Query::UpdateLedgerRange => {
            let sequence = int_at(operation, 0)?;
            let is_latest = bool_at(operation, 1)?;
            let expected = int_at(operation, 2)?;
            let mut tables = tables.write();
            let slot = &mut tables.ledger_range[usize::from(is_latest)];
            if *slot != Some(expected) {
                return Ok(ResultSet::not_applied());
            }
            *slot = Some(sequence);
            Ok(ResultSet::empty())
        }
    }
}
