//! JSON-RPC method handlers.
//!
//! Handlers validate their parameters, call the ledger backend and shape the
//! result. Protocol concerns (envelopes, batching, metrics) stay in the
//! router.

pub mod ledger;
pub mod server;
pub mod tx;

use crate::domain::config::LimitsConfig;
use crate::domain::error::{ApiError, ApiResult};
use lg_02_ledger_backend::LedgerBackendApi;
use shared_types::LedgerSequence;
use std::sync::Arc;

/// Container for all RPC handlers
pub struct RpcHandlers {
    backend: Arc<dyn LedgerBackendApi>,
    limits: LimitsConfig,
}

impl RpcHandlers {
    pub fn new(backend: Arc<dyn LedgerBackendApi>, limits: LimitsConfig) -> Self {
        Self { backend, limits }
    }

    pub fn backend(&self) -> &Arc<dyn LedgerBackendApi> {
        &self.backend
    }

    /// Requested ledger, or the newest known one.
    fn resolve_sequence(&self, requested: Option<LedgerSequence>) -> ApiResult<LedgerSequence> {
        match requested {
            Some(sequence) => Ok(sequence),
            None => self
                .backend
                .fetch_range()
                .map(|range| range.max_sequence)
                .ok_or_else(ApiError::not_ready),
        }
    }
}
