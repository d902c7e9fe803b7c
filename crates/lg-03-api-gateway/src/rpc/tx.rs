//! `tx`: transaction lookup by hash.
//!
//! A negative answer inside a caller-supplied window reports `searched_all`,
//! which is `true` only when every ledger of the window was already
//! persisted when the lookup started.

use super::RpcHandlers;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{blob_hex, TxParams, TxResult};
use lg_02_ledger_backend::{LedgerWindow, RangeError, TransactionLookup};
use shared_types::{Hash256, TransactionAndMetadata};
use tracing::{debug, instrument};

impl RpcHandlers {
    #[instrument(skip(self, params), fields(hash = %params.transaction))]
    pub async fn tx(&self, params: TxParams) -> ApiResult<TxResult> {
        let max_span = self.limits.max_ledger_span;
        let window = match (params.min_ledger, params.max_ledger) {
            (Some(min), Some(max)) => {
                Some(LedgerWindow::new(min, max, max_span).map_err(|e| match e {
                    RangeError::RangeExceeded { .. } => ApiError::excessive_ledger_range(max_span),
                    _ => ApiError::invalid_ledger_range(),
                })?)
            }
            (None, None) => None,
            // One bound without the other cannot describe a window
            _ => return Err(ApiError::invalid_ledger_range()),
        };

        match self.backend.fetch_transaction(params.transaction, window).await? {
            TransactionLookup::Found(tx) => Ok(render(params.transaction, tx, params.binary)),
            TransactionLookup::NotFound { exhaustive } => {
                debug!(exhaustive, windowed = window.is_some(), "Transaction not found");
                let err = ApiError::transaction_not_found();
                Err(match window {
                    Some(_) => err.with_field("searched_all", exhaustive),
                    None => err,
                })
            }
        }
    }
}

fn render(hash: Hash256, tx: TransactionAndMetadata, binary: bool) -> TxResult {
    TxResult {
        hash,
        ledger_index: tx.ledger_sequence,
        date: tx.date,
        tx: render_blob(&tx.transaction, binary),
        meta: render_blob(&tx.metadata, binary),
        validated: true,
    }
}

/// Hex unless `binary` is off and the blob is a JSON object.
fn render_blob(blob: &[u8], binary: bool) -> serde_json::Value {
    if !binary {
        let decoded = serde_json::from_slice::<serde_json::Value>(blob);
        if let Ok(value @ serde_json::Value::Object(_)) = decoded {
            return value;
        }
    }
    serde_json::Value::String(blob_hex(blob))
}
