//! # Backend Factory
//!
//! Builds a [`LedgerBackend`] from configuration.
//!
//! | Situation | Result |
//! |-----------|--------|
//! | unknown `database.type` | `UnknownDatabase` |
//! | empty database, read-write | backend with no range |
//! | empty database, read-only | `EmptyReadOnly` |
//! | populated database | backend with the persisted range |

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use lg_01_storage_executor::{ClusterConfig, ExecutorConfig, InMemoryCluster, StorageConnection};
use shared_types::NodeMode;

use crate::domain::errors::BackendError;
use crate::service::LedgerBackend;

/// Database section of the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Backend kind; `"memory"` is the only built-in one
    #[serde(rename = "type")]
    pub kind: String,
    /// Simulated cluster nodes
    pub nodes: usize,
    /// Threads completing storage submissions
    pub worker_threads: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let cluster = ClusterConfig::default();
        Self {
            kind: DatabaseConfig::MEMORY.to_string(),
            nodes: cluster.nodes,
            worker_threads: cluster.worker_threads,
        }
    }
}

impl DatabaseConfig {
    pub const MEMORY: &'static str = "memory";

    fn cluster(&self) -> ClusterConfig {
        ClusterConfig {
            nodes: self.nodes,
            worker_threads: self.worker_threads,
        }
    }
}

/// Everything needed to build a backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub read_only: bool,
    pub database: DatabaseConfig,
    pub executor: ExecutorConfig,
}

impl BackendConfig {
    pub fn mode(&self) -> NodeMode {
        NodeMode::from_read_only(self.read_only)
    }
}

/// Connect to the configured database.
pub fn make_connection(config: &DatabaseConfig) -> Result<Arc<dyn StorageConnection>, BackendError> {
    match config.kind.to_ascii_lowercase().as_str() {
        DatabaseConfig::MEMORY => Ok(Arc::new(InMemoryCluster::new(config.cluster())?)),
        _ => Err(BackendError::UnknownDatabase(config.kind.clone())),
    }
}

/// Build a backend from configuration.
pub async fn make_backend(config: &BackendConfig) -> Result<LedgerBackend, BackendError> {
    info!(
        database = %config.database.kind,
        read_only = config.read_only,
        "Constructing ledger backend"
    );
    let connection = make_connection(&config.database)?;
    LedgerBackend::open(connection, config.executor.clone(), config.mode()).await
}
