//! # Ledger Backend Service
//!
//! Composes the storage executor and the range tracker into ledger-level
//! operations.
//!
//! ## Write path
//!
//! ```text
//! write_ledger(seq)
//!   ├─ seq must be max + 1 (any sequence on an empty database)
//!   ├─ header, transactions, objects ──concurrently──→ executor
//!   ├─ range rows: initialise both (first ledger) or
//!   │  conditional update of the maximum (IF sequence = seq - 1)
//!   └─ tracker.extend(seq) ──→ subscribers
//! ```
//!
//! Any failure before the last step leaves the published range untouched,
//! so readers never see a ledger that is not fully persisted.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use lg_01_storage_executor::{
    AsyncExecutor, ExecutorConfig, Operation, Query, StorageConnection, Value,
};
use shared_types::{Hash256, LedgerEntry, LedgerHeader, LedgerRange, LedgerSequence, NodeMode};

use crate::adapters::codec;
use crate::domain::errors::{BackendError, RangeError};
use crate::domain::range::{check_advance_min, coverage, RangeTracker};
use crate::domain::records::{LedgerWrite, TransactionLookup};
use crate::domain::window::LedgerWindow;
use crate::ports::inbound::LedgerBackendApi;

/// Backend facade over one storage connection.
pub struct LedgerBackend {
    executor: AsyncExecutor,
    tracker: RangeTracker,
}

impl LedgerBackend {
    /// Open a backend over `connection`, loading the persisted range.
    ///
    /// ## Errors
    ///
    /// - `EmptyReadOnly`: read-only mode over a database with no ledgers
    /// - `Storage`/`Corrupt`: the range rows could not be read
    pub async fn open(
        connection: Arc<dyn StorageConnection>,
        executor_config: ExecutorConfig,
        mode: NodeMode,
    ) -> Result<Self, BackendError> {
        executor_config.validate()?;
        let executor = AsyncExecutor::new(connection, executor_config, mode);
        let range = read_range(&executor).await?;

        if range.is_none() && mode.is_read_only() {
            return Err(BackendError::EmptyReadOnly);
        }

        match range {
            Some(range) => info!(%range, ?mode, "Ledger backend opened"),
            None => info!(?mode, "Ledger backend opened on empty database"),
        }

        Ok(Self {
            executor,
            tracker: RangeTracker::new(range),
        })
    }

    /// Underlying executor (for draining on shutdown).
    pub fn executor(&self) -> &AsyncExecutor {
        &self.executor
    }

    pub fn tracker(&self) -> &RangeTracker {
        &self.tracker
    }

    fn ensure_writable(&self) -> Result<(), BackendError> {
        if self.executor.mode().is_read_only() {
            return Err(BackendError::ReadOnly);
        }
        Ok(())
    }

    fn ledger_write_operations(&self, write: &LedgerWrite) -> Result<Vec<Operation>, BackendError> {
        let sequence = write.header.sequence;
        let mut operations = Vec::with_capacity(1 + write.transactions.len() + write.objects.len());

        operations.push(Operation::new(
            Query::InsertLedgerHeader,
            vec![
                Value::Int(sequence),
                Value::Blob(codec::encode_header(&write.header)?),
            ],
        ));

        for tx in &write.transactions {
            if tx.ledger_sequence != sequence {
                return Err(BackendError::InvalidWrite(format!(
                    "transaction {} stamped with ledger {}, writing ledger {}",
                    tx.hash(),
                    tx.ledger_sequence,
                    sequence
                )));
            }
            operations.push(Operation::new(
                Query::InsertTransaction,
                vec![
                    Value::Blob(tx.hash().to_vec()),
                    Value::Blob(tx.transaction.clone()),
                    Value::Blob(tx.metadata.clone()),
                    Value::Int(sequence),
                    Value::Int(tx.date),
                ],
            ));
        }

        for (key, blob) in &write.objects {
            operations.push(Operation::new(
                Query::InsertEntry,
                vec![Value::Blob(key.to_vec()), Value::Int(sequence), Value::Blob(blob.clone())],
            ));
        }

        Ok(operations)
    }

    /// Conditional update of the persisted range rows for a new maximum.
    async fn persist_range_extension(
        &self,
        current: Option<LedgerRange>,
        sequence: LedgerSequence,
    ) -> Result<(), BackendError> {
        let (operation, expected) = match current {
            // First ledger: both rows in one statement, only while unset
            None => (
                Operation::new(Query::InitLedgerRange, vec![Value::Int(sequence)]),
                None,
            ),
            Some(_) => (
                Operation::new(
                    Query::UpdateLedgerRange,
                    vec![
                        Value::Int(sequence),
                        Value::Bool(true),
                        Value::Int(sequence - 1),
                    ],
                ),
                Some(sequence - 1),
            ),
        };

        let rows = self.executor.execute(operation).await?;
        if !rows.applied {
            return Err(BackendError::RangeConflict { expected });
        }
        Ok(())
    }
}

async fn read_range(executor: &AsyncExecutor) -> Result<Option<LedgerRange>, BackendError> {
    let rows = executor
        .execute(Operation::new(Query::SelectLedgerRange, vec![]))
        .await?;
    codec::decode_range(&rows)
}

#[async_trait]
impl LedgerBackendApi for LedgerBackend {
    #[instrument(skip(self, hash), fields(hash = %hash))]
    async fn fetch_transaction(
        &self,
        hash: Hash256,
        window: Option<LedgerWindow>,
    ) -> Result<TransactionLookup, BackendError> {
        // Snapshot before the read: only ledgers persisted by now can make a
        // miss conclusive.
        let known = self.tracker.snapshot();
        let exhaustive = match window {
            Some(window) => coverage(window.min(), window.max(), known)?.is_full(),
            None => known.is_some(),
        };

        let rows = self
            .executor
            .execute(Operation::new(
                Query::SelectTransaction,
                vec![Value::Blob(hash.to_vec())],
            ))
            .await?;

        match rows.first() {
            Some(row) => Ok(TransactionLookup::Found(codec::decode_transaction(row)?)),
            None => {
                debug!(exhaustive, "Transaction not found");
                Ok(TransactionLookup::NotFound { exhaustive })
            }
        }
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn fetch_entry(
        &self,
        key: Hash256,
        sequence: Option<LedgerSequence>,
    ) -> Result<Option<LedgerEntry>, BackendError> {
        let known = self.tracker.snapshot();
        let sequence = match (sequence, known) {
            (Some(seq), Some(range)) if range.contains(seq) => seq,
            (Some(seq), _) => return Err(BackendError::ledger_not_found(seq, known)),
            (None, Some(range)) => range.max_sequence,
            (None, None) => return Err(BackendError::Empty),
        };

        let rows = self
            .executor
            .execute(Operation::new(
                Query::SelectEntry,
                vec![Value::Blob(key.to_vec()), Value::Int(sequence)],
            ))
            .await?;

        match rows.first() {
            Some(row) => {
                let entry = codec::decode_entry(key, row)?;
                Ok((!entry.is_deleted()).then_some(entry))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_ledger_header(
        &self,
        sequence: LedgerSequence,
    ) -> Result<LedgerHeader, BackendError> {
        let known = self.tracker.snapshot();
        if !known.is_some_and(|range| range.contains(sequence)) {
            return Err(BackendError::ledger_not_found(sequence, known));
        }

        let rows = self
            .executor
            .execute(Operation::new(
                Query::SelectLedgerHeader,
                vec![Value::Int(sequence)],
            ))
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| BackendError::ledger_not_found(sequence, known))?;
        let header = codec::decode_header(row.blob(0)?)?;
        if header.sequence != sequence {
            return Err(BackendError::Corrupt(format!(
                "header stored under {} claims sequence {}",
                sequence, header.sequence
            )));
        }
        Ok(header)
    }

    #[instrument(skip(self, write), fields(sequence = write.header.sequence))]
    async fn write_ledger(&self, write: LedgerWrite) -> Result<LedgerRange, BackendError> {
        self.ensure_writable()?;
        let sequence = write.header.sequence;

        let current = self.tracker.snapshot();
        if let Some(current) = current {
            if sequence <= current.max_sequence {
                return Err(RangeError::NotIncreasing {
                    sequence,
                    max: current.max_sequence,
                }
                .into());
            }
            if sequence != current.max_sequence + 1 {
                return Err(RangeError::NotContiguous {
                    sequence,
                    expected: current.max_sequence + 1,
                }
                .into());
            }
        }

        let operations = self.ledger_write_operations(&write)?;
        let count = operations.len();
        let results = join_all(operations.into_iter().map(|op| self.executor.execute(op))).await;
        if let Some(err) = results.into_iter().find_map(Result::err) {
            warn!(error = %err, "Ledger write failed; range not advanced");
            return Err(err.into());
        }

        self.persist_range_extension(current, sequence).await?;
        let range = self.tracker.extend(sequence)?;

        info!(%range, records = count, "Ledger written");
        Ok(range)
    }

    #[instrument(skip(self))]
    async fn advance_min_sequence(
        &self,
        sequence: LedgerSequence,
    ) -> Result<LedgerRange, BackendError> {
        self.ensure_writable()?;
        let current = self.tracker.snapshot().ok_or(BackendError::Empty)?;
        check_advance_min(current, sequence)?;
        if sequence == current.min_sequence {
            return Ok(current);
        }

        let rows = self
            .executor
            .execute(Operation::new(
                Query::UpdateLedgerRange,
                vec![
                    Value::Int(sequence),
                    Value::Bool(false),
                    Value::Int(current.min_sequence),
                ],
            ))
            .await?;
        if !rows.applied {
            return Err(BackendError::RangeConflict {
                expected: Some(current.min_sequence),
            });
        }

        Ok(self.tracker.advance_min(sequence)?)
    }

    async fn hard_fetch_range(&self) -> Result<Option<LedgerRange>, BackendError> {
        read_range(&self.executor).await
    }

    fn fetch_range(&self) -> Option<LedgerRange> {
        self.tracker.snapshot()
    }

    fn publish_range(&self, observed: LedgerRange) -> Option<LedgerRange> {
        self.tracker.seed(observed)
    }

    fn subscribe_ranges(&self) -> broadcast::Receiver<LedgerRange> {
        self.tracker.subscribe()
    }

    fn mode(&self) -> NodeMode {
        self.executor.mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_01_storage_executor::{
        ClusterConfig, ErrorCode, Fault, FaultyConnection, InMemoryCluster, NodeHealth,
        OperationClass, StorageError,
    };
    use shared_types::{ErrorKind, TransactionAndMetadata};

    fn cluster() -> Arc<InMemoryCluster> {
        Arc::new(InMemoryCluster::new(ClusterConfig::default()).unwrap())
    }

    fn header(sequence: u64) -> LedgerHeader {
        LedgerHeader {
            sequence,
            hash: Hash256::digest(&sequence.to_be_bytes()),
            parent_hash: Hash256::digest(&(sequence - 1).to_be_bytes()),
            close_time: 1_000 + sequence,
        }
    }

    fn tx(sequence: u64, body: &[u8]) -> TransactionAndMetadata {
        TransactionAndMetadata {
            transaction: body.to_vec(),
            metadata: vec![0xAA],
            ledger_sequence: sequence,
            date: 1_000 + sequence,
        }
    }

    async fn writer(connection: Arc<dyn StorageConnection>) -> LedgerBackend {
        LedgerBackend::open(connection, ExecutorConfig::default(), NodeMode::ReadWrite)
            .await
            .unwrap()
    }

    async fn write_ledgers(backend: &LedgerBackend, sequences: impl IntoIterator<Item = u64>) {
        for seq in sequences {
            backend.write_ledger(LedgerWrite::new(header(seq))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_database_has_no_range() {
        let backend = writer(cluster()).await;
        assert_eq!(backend.fetch_range(), None);
        assert_eq!(backend.hard_fetch_range().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_first_write_seeds_range_then_extends_by_one() {
        let backend = writer(cluster()).await;
        write_ledgers(&backend, 10..=12).await;
        assert_eq!(backend.fetch_range(), LedgerRange::new(10, 12));
        assert_eq!(backend.hard_fetch_range().await.unwrap(), LedgerRange::new(10, 12));
    }

    #[tokio::test]
    async fn test_gapped_write_rejected_before_storage() {
        let faulty = Arc::new(FaultyConnection::new(cluster()));
        let backend = writer(faulty.clone()).await;
        write_ledgers(&backend, [10]).await;
        let submissions = faulty.submissions();

        let err = backend.write_ledger(LedgerWrite::new(header(30))).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Range(RangeError::NotContiguous {
                sequence: 30,
                expected: 11
            })
        );
        assert_eq!(faulty.submissions(), submissions);
        assert_eq!(backend.fetch_range(), LedgerRange::new(10, 10));
        assert_eq!(backend.hard_fetch_range().await.unwrap(), LedgerRange::new(10, 10));

        // Never-ingested ledgers cannot make a miss conclusive
        let window = LedgerWindow::new(15, 20, 1000).unwrap();
        assert_eq!(
            backend
                .fetch_transaction(Hash256::digest(b"missing"), Some(window))
                .await
                .unwrap(),
            TransactionLookup::NotFound { exhaustive: false }
        );
    }

    #[tokio::test]
    async fn test_failed_first_range_write_can_be_retried() {
        let shared = cluster();
        let faulty = Arc::new(FaultyConnection::new(shared.clone()));
        let backend = writer(faulty.clone()).await;

        faulty.inject_for_query(Query::InitLedgerRange, Fault::Fail(ErrorCode::Unauthorized));
        let err = backend.write_ledger(LedgerWrite::new(header(1))).await.unwrap_err();
        assert!(matches!(err, BackendError::Storage(StorageError::Fatal { .. })));
        assert_eq!(backend.fetch_range(), None);
        assert_eq!(backend.hard_fetch_range().await.unwrap(), None);

        write_ledgers(&backend, [1]).await;
        assert_eq!(backend.fetch_range(), LedgerRange::new(1, 1));

        let reopened = writer(shared).await;
        assert_eq!(reopened.fetch_range(), LedgerRange::new(1, 1));
    }

    #[tokio::test]
    async fn test_first_range_write_is_idempotent() {
        let shared = cluster();
        let first = writer(shared.clone()).await;
        let second = writer(shared.clone()).await;
        let late = writer(shared.clone()).await;

        // All three believe the database is empty
        write_ledgers(&first, [1]).await;
        write_ledgers(&second, [1]).await;
        assert_eq!(second.hard_fetch_range().await.unwrap(), LedgerRange::new(1, 1));

        let err = late.write_ledger(LedgerWrite::new(header(5))).await.unwrap_err();
        assert_eq!(err, BackendError::RangeConflict { expected: None });
        assert_eq!(late.fetch_range(), None);
        assert_eq!(late.hard_fetch_range().await.unwrap(), LedgerRange::new(1, 1));
    }

    #[tokio::test]
    async fn test_concurrent_writes_never_publish_unwritten_ledgers() {
        let backend = writer(cluster()).await;
        write_ledgers(&backend, [1]).await;
        let mut published = backend.subscribe_ranges();

        let (next, after_next) = tokio::join!(
            backend.write_ledger(LedgerWrite::new(header(2))),
            backend.write_ledger(LedgerWrite::new(header(3))),
        );
        assert_eq!(next, Ok(LedgerRange::new(1, 2).unwrap()));
        assert_eq!(
            after_next,
            Err(BackendError::Range(RangeError::NotContiguous {
                sequence: 3,
                expected: 2
            }))
        );

        // Reverse submission order: the gapped write still fails up front
        let (after_next, next) = tokio::join!(
            backend.write_ledger(LedgerWrite::new(header(4))),
            backend.write_ledger(LedgerWrite::new(header(3))),
        );
        assert!(after_next.is_err());
        assert_eq!(next, Ok(LedgerRange::new(1, 3).unwrap()));

        let range = backend.hard_fetch_range().await.unwrap().unwrap();
        assert_eq!(range, LedgerRange::new(1, 3).unwrap());
        while let Ok(update) = published.try_recv() {
            for sequence in update.min_sequence..=update.max_sequence {
                assert_eq!(backend.fetch_ledger_header(sequence).await.unwrap(), header(sequence));
            }
        }
    }

    #[tokio::test]
    async fn test_transaction_found_and_window_exhaustiveness() {
        let backend = writer(cluster()).await;
        let stored = tx(100, b"payment");
        backend
            .write_ledger(LedgerWrite::new(header(100)).with_transaction(stored.clone()))
            .await
            .unwrap();
        write_ledgers(&backend, 101..=500).await;

        let found = backend.fetch_transaction(stored.hash(), None).await.unwrap();
        assert_eq!(found, TransactionLookup::Found(stored.clone()));

        // Found even outside the window
        let window = LedgerWindow::new(200, 300, 1000).unwrap();
        let found = backend.fetch_transaction(stored.hash(), Some(window)).await.unwrap();
        assert_eq!(found.found(), Some(&stored));

        let missing = Hash256::digest(b"missing");
        let partial = LedgerWindow::new(1, 1000, 1000).unwrap();
        assert_eq!(
            backend.fetch_transaction(missing, Some(partial)).await.unwrap(),
            TransactionLookup::NotFound { exhaustive: false }
        );
        let full = LedgerWindow::new(150, 450, 1000).unwrap();
        assert_eq!(
            backend.fetch_transaction(missing, Some(full)).await.unwrap(),
            TransactionLookup::NotFound { exhaustive: true }
        );
        assert_eq!(
            backend.fetch_transaction(missing, None).await.unwrap(),
            TransactionLookup::NotFound { exhaustive: true }
        );
    }

    #[tokio::test]
    async fn test_not_found_on_empty_backend_is_inconclusive() {
        let backend = writer(cluster()).await;
        assert_eq!(
            backend.fetch_transaction(Hash256::ZERO, None).await.unwrap(),
            TransactionLookup::NotFound { exhaustive: false }
        );
    }

    #[tokio::test]
    async fn test_entry_versions_and_deletion() {
        let backend = writer(cluster()).await;
        let key = Hash256::digest(b"account");
        backend
            .write_ledger(LedgerWrite::new(header(5)).with_object(key, vec![5]))
            .await
            .unwrap();
        backend
            .write_ledger(LedgerWrite::new(header(6)).with_object(key, vec![6]))
            .await
            .unwrap();
        backend
            .write_ledger(LedgerWrite::new(header(7)).with_object(key, vec![]))
            .await
            .unwrap();

        let at5 = backend.fetch_entry(key, Some(5)).await.unwrap().unwrap();
        assert_eq!((at5.sequence, at5.blob), (5, vec![5]));
        let at6 = backend.fetch_entry(key, Some(6)).await.unwrap().unwrap();
        assert_eq!(at6.blob, vec![6]);
        assert_eq!(backend.fetch_entry(key, None).await.unwrap(), None);
        assert_eq!(backend.fetch_entry(Hash256::ZERO, Some(6)).await.unwrap(), None);

        let err = backend.fetch_entry(key, Some(8)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_entry_on_empty_backend() {
        let backend = writer(cluster()).await;
        assert_eq!(
            backend.fetch_entry(Hash256::ZERO, None).await.unwrap_err(),
            BackendError::Empty
        );
    }

    #[tokio::test]
    async fn test_header_lookup() {
        let backend = writer(cluster()).await;
        write_ledgers(&backend, 1..=3).await;
        assert_eq!(backend.fetch_ledger_header(2).await.unwrap(), header(2));
        assert!(matches!(
            backend.fetch_ledger_header(4).await,
            Err(BackendError::LedgerNotFound { sequence: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_write_must_extend_range() {
        let backend = writer(cluster()).await;
        write_ledgers(&backend, [10]).await;
        let err = backend.write_ledger(LedgerWrite::new(header(10))).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Range(RangeError::NotIncreasing {
                sequence: 10,
                max: 10
            })
        );
    }

    #[tokio::test]
    async fn test_mismatched_transaction_sequence_rejected() {
        let backend = writer(cluster()).await;
        let err = backend
            .write_ledger(LedgerWrite::new(header(3)).with_transaction(tx(4, b"x")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(backend.fetch_range(), None);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_range_untouched() {
        let faulty = Arc::new(FaultyConnection::new(cluster()));
        let backend = writer(faulty.clone()).await;
        write_ledgers(&backend, [1]).await;

        faulty.inject_for_query(Query::InsertEntry, Fault::Fail(ErrorCode::Unauthorized));
        let err = backend
            .write_ledger(LedgerWrite::new(header(2)).with_object(Hash256::ZERO, vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Storage(StorageError::Fatal { .. })));
        assert_eq!(backend.fetch_range(), LedgerRange::new(1, 1));
        assert_eq!(backend.hard_fetch_range().await.unwrap(), LedgerRange::new(1, 1));
    }

    #[tokio::test]
    async fn test_transient_write_failure_is_retried() {
        let faulty = Arc::new(FaultyConnection::new(cluster()));
        let backend = writer(faulty.clone()).await;
        faulty.inject_for_class(OperationClass::Write, Fault::Fail(ErrorCode::RequestTimedOut));
        write_ledgers(&backend, [1]).await;
        assert_eq!(faulty.injected(), 1);
        assert_eq!(backend.fetch_range(), LedgerRange::new(1, 1));
    }

    #[tokio::test]
    async fn test_concurrent_range_writer_conflicts() {
        let shared = cluster();
        let a = writer(shared.clone()).await;
        write_ledgers(&a, [1]).await;
        let b = writer(shared.clone()).await;
        write_ledgers(&a, [2]).await;

        // b still believes max is 1
        let err = b.write_ledger(LedgerWrite::new(header(2))).await.unwrap_err();
        assert_eq!(err, BackendError::RangeConflict { expected: Some(1) });
        assert_eq!(b.fetch_range(), LedgerRange::new(1, 1));
    }

    #[tokio::test]
    async fn test_exhausted_reads_surface_unavailable() {
        let shared = cluster();
        let backend = writer(shared.clone()).await;
        write_ledgers(&backend, [1]).await;
        shared.set_all_health(NodeHealth::Slow);

        let err = backend.fetch_transaction(Hash256::ZERO, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(matches!(
            err,
            BackendError::Storage(StorageError::Transient { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_advance_min_sequence() {
        let backend = writer(cluster()).await;
        write_ledgers(&backend, 1..=10).await;
        assert_eq!(
            backend.advance_min_sequence(4).await.unwrap(),
            LedgerRange::new(4, 10).unwrap()
        );
        assert_eq!(backend.hard_fetch_range().await.unwrap(), LedgerRange::new(4, 10));
        assert!(backend.advance_min_sequence(2).await.is_err());
        assert!(backend.advance_min_sequence(11).await.is_err());
    }

    #[tokio::test]
    async fn test_read_only_rejects_every_write() {
        let shared = cluster();
        write_ledgers(&writer(shared.clone()).await, [1, 2]).await;

        let reader = LedgerBackend::open(shared, ExecutorConfig::default(), NodeMode::ReadOnly)
            .await
            .unwrap();
        assert_eq!(reader.fetch_range(), LedgerRange::new(1, 2));
        for _ in 0..2 {
            assert_eq!(
                reader.write_ledger(LedgerWrite::new(header(3))).await,
                Err(BackendError::ReadOnly)
            );
        }
        assert_eq!(reader.advance_min_sequence(2).await, Err(BackendError::ReadOnly));
        assert_eq!(reader.fetch_ledger_header(2).await.unwrap(), header(2));
    }

    #[tokio::test]
    async fn test_read_only_over_empty_database_fails() {
        let result = LedgerBackend::open(cluster(), ExecutorConfig::default(), NodeMode::ReadOnly).await;
        assert!(matches!(result, Err(BackendError::EmptyReadOnly)));
    }

    #[tokio::test]
    async fn test_publish_range_feeds_subscribers() {
        let shared = cluster();
        let writer_node = writer(shared.clone()).await;
        write_ledgers(&writer_node, [1]).await;
        let reader = LedgerBackend::open(shared, ExecutorConfig::default(), NodeMode::ReadOnly)
            .await
            .unwrap();
        let mut updates = reader.subscribe_ranges();

        write_ledgers(&writer_node, [2, 3]).await;
        let observed = reader.hard_fetch_range().await.unwrap().unwrap();
        assert_eq!(reader.publish_range(observed), LedgerRange::new(1, 3));
        assert_eq!(updates.recv().await.unwrap(), LedgerRange::new(1, 3).unwrap());
        assert_eq!(reader.publish_range(observed), None);
    }
}
