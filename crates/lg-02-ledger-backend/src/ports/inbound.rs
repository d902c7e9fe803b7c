//! # Inbound Ports (Driving Ports)
//!
//! The API the RPC layer drives. Implemented by
//! [`LedgerBackend`](crate::service::LedgerBackend).

use async_trait::async_trait;
use shared_types::{Hash256, LedgerEntry, LedgerHeader, LedgerRange, LedgerSequence, NodeMode};
use tokio::sync::broadcast;

use crate::domain::errors::BackendError;
use crate::domain::records::{LedgerWrite, TransactionLookup};
use crate::domain::window::LedgerWindow;

/// Primary API of the ledger backend.
///
/// Every read is evaluated against a range snapshot taken before storage is
/// queried, so a negative answer is only called exhaustive when every
/// relevant ledger was already persisted at that point.
#[async_trait]
pub trait LedgerBackendApi: Send + Sync {
    /// Look up a transaction by hash.
    ///
    /// A found transaction is returned even if it lies outside `window`.
    ///
    /// ## Errors
    ///
    /// - `Storage`: storage failed after retries, or fatally
    async fn fetch_transaction(
        &self,
        hash: Hash256,
        window: Option<LedgerWindow>,
    ) -> Result<TransactionLookup, BackendError>;

    /// Newest version of `key` at or below `sequence` (default: range max).
    /// Deleted entries read as `None`.
    ///
    /// ## Errors
    ///
    /// - `LedgerNotFound`: `sequence` is outside the known range
    /// - `Empty`: no sequence given and no ledgers are known
    async fn fetch_entry(
        &self,
        key: Hash256,
        sequence: Option<LedgerSequence>,
    ) -> Result<Option<LedgerEntry>, BackendError>;

    /// Header of a ledger inside the known range.
    async fn fetch_ledger_header(
        &self,
        sequence: LedgerSequence,
    ) -> Result<LedgerHeader, BackendError>;

    /// Persist a closed ledger, then publish it.
    ///
    /// ## Errors
    ///
    /// - `ReadOnly`: this node never writes
    /// - `Range(NotIncreasing)`: the ledger does not extend the range
    /// - `RangeConflict`: another writer moved the persisted range
    async fn write_ledger(&self, write: LedgerWrite) -> Result<LedgerRange, BackendError>;

    /// Raise the persisted and published minimum.
    async fn advance_min_sequence(
        &self,
        sequence: LedgerSequence,
    ) -> Result<LedgerRange, BackendError>;

    /// Read the persisted range rows, bypassing the cached snapshot.
    async fn hard_fetch_range(&self) -> Result<Option<LedgerRange>, BackendError>;

    /// Cached range snapshot.
    fn fetch_range(&self) -> Option<LedgerRange>;

    /// Merge a persisted range into the cached one. Returns the new range if
    /// it changed.
    fn publish_range(&self, observed: LedgerRange) -> Option<LedgerRange>;

    /// Every range published from now on.
    fn subscribe_ranges(&self) -> broadcast::Receiver<LedgerRange>;

    fn mode(&self) -> NodeMode;
}
