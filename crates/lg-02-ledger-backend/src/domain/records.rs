//! Facade inputs and results.

use shared_types::{Hash256, LedgerHeader, TransactionAndMetadata};

/// Result of a transaction lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionLookup {
    Found(TransactionAndMetadata),
    /// `exhaustive` is true only when every ledger that could hold the
    /// transaction is known to be persisted.
    NotFound { exhaustive: bool },
}

impl TransactionLookup {
    pub fn found(&self) -> Option<&TransactionAndMetadata> {
        match self {
            TransactionLookup::Found(tx) => Some(tx),
            TransactionLookup::NotFound { .. } => None,
        }
    }
}

/// Everything persisted for one closed ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerWrite {
    pub header: LedgerHeader,
    /// Every transaction's `ledger_sequence` must equal the header's.
    pub transactions: Vec<TransactionAndMetadata>,
    /// State objects changed in this ledger; an empty blob deletes the key.
    pub objects: Vec<(Hash256, Vec<u8>)>,
}

impl LedgerWrite {
    pub fn new(header: LedgerHeader) -> Self {
        Self {
            header,
            transactions: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn with_transaction(mut self, tx: TransactionAndMetadata) -> Self {
        self.transactions.push(tx);
        self
    }

    pub fn with_object(mut self, key: Hash256, blob: Vec<u8>) -> Self {
        self.objects.push((key, blob));
        self
    }
}
