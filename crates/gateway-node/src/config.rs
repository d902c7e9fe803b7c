//! # Node Configuration
//!
//! Unified configuration for the backend, the executor and the gateway,
//! read from a JSON file. Every section is optional and falls back to its
//! defaults.

use std::path::Path;
use std::time::Duration;

use lg_01_storage_executor::ExecutorConfig;
use lg_02_ledger_backend::{BackendConfig, DatabaseConfig};
use lg_03_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use shared_types::duration_serde;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Serve queries only; ledgers are written by another process.
    pub read_only: bool,
    pub database: DatabaseConfig,
    pub executor: ExecutorConfig,
    pub gateway: GatewayConfig,
    /// Range polling for read-only nodes.
    pub monitor: MonitorConfig,
}

/// Range monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay between two reads of the persisted range
    #[serde(with = "duration_serde")]
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("executor: {0}")]
    Executor(#[from] lg_01_storage_executor::ConfigError),

    #[error("gateway: {0}")]
    Gateway(#[from] lg_03_api_gateway::domain::config::ConfigError),

    #[error("monitor.interval cannot be 0")]
    ZeroMonitorInterval,
}

impl NodeConfig {
    /// Load from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, NodeConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| NodeConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| NodeConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NodeConfigError> {
        self.executor.validate()?;
        self.gateway.validate()?;
        if self.monitor.interval.is_zero() {
            return Err(NodeConfigError::ZeroMonitorInterval);
        }
        Ok(())
    }

    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            read_only: self.read_only,
            database: self.database.clone(),
            executor: self.executor.clone(),
        }
    }
}
