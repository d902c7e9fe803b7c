//! # Range Monitor
//!
//! A read-only node never writes, so its cached range only moves when it
//! re-reads the persisted range rows. The monitor does that on a fixed
//! interval and publishes any extension, which also reaches `ledger`
//! stream subscribers.

use std::sync::Arc;
use std::time::Duration;

use lg_02_ledger_backend::{BackendError, LedgerBackendApi};
use shared_types::LedgerRange;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct RangeMonitor {
    backend: Arc<dyn LedgerBackendApi>,
    interval: Duration,
}

impl RangeMonitor {
    pub fn new(backend: Arc<dyn LedgerBackendApi>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Read the persisted range once and merge it into the cached one.
    ///
    /// Returns the new range when it changed.
    pub async fn poll_once(&self) -> Result<Option<LedgerRange>, BackendError> {
        let Some(observed) = self.backend.hard_fetch_range().await? else {
            return Ok(None);
        };
        Ok(self.backend.publish_range(observed))
    }

    /// Poll until `shutdown` changes.
    pub fn spawn(self, mut shutdown: watch::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval = ?self.interval, "Range monitor started");
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => match self.poll_once().await {
                        Ok(Some(range)) => debug!(%range, "Published persisted range"),
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Failed to read persisted range"),
                    },
                    _ = shutdown.changed() => break,
                }
            }
            info!("Range monitor stopped");
        })
    }
}
