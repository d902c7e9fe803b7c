//! Ledger methods: `ledger_range`, `ledger_entry` and `ledger`.

use super::RpcHandlers;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    blob_hex, LedgerEntryParams, LedgerEntryResult, LedgerParams, LedgerRangeResult, LedgerResult,
};
use tracing::instrument;

impl RpcHandlers {
    /// Known range, or `notReady` before the first ledger.
    pub fn ledger_range(&self) -> ApiResult<LedgerRangeResult> {
        self.backend
            .fetch_range()
            .map(LedgerRangeResult::from)
            .ok_or_else(ApiError::not_ready)
    }

    #[instrument(skip(self, params), fields(index = %params.index))]
    pub async fn ledger_entry(&self, params: LedgerEntryParams) -> ApiResult<LedgerEntryResult> {
        let sequence = self.resolve_sequence(params.ledger_index)?;
        match self.backend.fetch_entry(params.index, Some(sequence)).await? {
            Some(entry) => Ok(LedgerEntryResult {
                index: params.index,
                ledger_index: sequence,
                node_binary: blob_hex(&entry.blob),
            }),
            None => Err(ApiError::entry_not_found()),
        }
    }

    #[instrument(skip(self))]
    pub async fn ledger(&self, params: LedgerParams) -> ApiResult<LedgerResult> {
        let sequence = self.resolve_sequence(params.ledger_index)?;
        let header = self.backend.fetch_ledger_header(sequence).await?;
        Ok(LedgerResult {
            ledger: header.into(),
            ledger_index: sequence,
            validated: true,
        })
    }
}
