//! Node runtime: backend, gateway, range monitor and their shutdown order.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use lg_02_ledger_backend::{make_backend, LedgerBackend, LedgerBackendApi};
use lg_03_api_gateway::ApiGatewayService;
use tokio::sync::watch;
use tracing::info;

use crate::config::NodeConfig;
use crate::monitor::RangeMonitor;

pub struct NodeRuntime {
    config: NodeConfig,
    backend: Arc<LedgerBackend>,
}

impl NodeRuntime {
    /// Build the backend. Fails on an unknown database type and on a
    /// read-only node over an empty database.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        let backend = make_backend(&config.backend())
            .await
            .context("Failed to construct ledger backend")?;
        Ok(Self {
            config,
            backend: Arc::new(backend),
        })
    }

    pub fn backend(&self) -> Arc<LedgerBackend> {
        Arc::clone(&self.backend)
    }

    /// Serve until `shutdown` resolves, then stop the monitor and drain the
    /// executor.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let backend: Arc<dyn LedgerBackendApi> = self.backend.clone();
        let service = ApiGatewayService::new(self.config.gateway.clone(), Arc::clone(&backend))
            .context("Invalid gateway configuration")?;

        let (stop_tx, stop_rx) = watch::channel(());
        let monitor = self.config.read_only.then(|| {
            RangeMonitor::new(Arc::clone(&backend), self.config.monitor.interval).spawn(stop_rx)
        });

        match self.backend.fetch_range() {
            Some(range) => info!(%range, read_only = self.config.read_only, "Node is serving"),
            None => info!(read_only = self.config.read_only, "Node is serving an empty database"),
        }

        let served = service.run(shutdown).await;

        info!("Initiating graceful shutdown...");
        let _ = stop_tx.send(());
        if let Some(monitor) = monitor {
            let _ = monitor.await;
        }
        self.backend.executor().drain().await;
        info!("Shutdown complete");

        served.context("API gateway failed")
    }
}
