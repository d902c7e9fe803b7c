//! Row and blob codecs.
//!
//! Ledger headers are stored as bincode blobs; every other record maps
//! column-by-column onto the statement layouts of
//! [`Query`](lg_01_storage_executor::Query).

use lg_01_storage_executor::{ResultSet, Row};
use shared_types::{Hash256, LedgerEntry, LedgerHeader, LedgerRange, TransactionAndMetadata};

use crate::domain::errors::BackendError;

pub fn encode_header(header: &LedgerHeader) -> Result<Vec<u8>, BackendError> {
    Ok(bincode::serialize(header)?)
}

pub fn decode_header(blob: &[u8]) -> Result<LedgerHeader, BackendError> {
    Ok(bincode::deserialize(blob)?)
}

/// `[Blob tx, Blob meta, Int sequence, Int date]`
pub fn decode_transaction(row: &Row) -> Result<TransactionAndMetadata, BackendError> {
    Ok(TransactionAndMetadata {
        transaction: row.blob(0)?.to_vec(),
        metadata: row.blob(1)?.to_vec(),
        ledger_sequence: row.int(2)?,
        date: row.int(3)?,
    })
}

/// `[Int sequence, Blob blob]`
pub fn decode_entry(key: Hash256, row: &Row) -> Result<LedgerEntry, BackendError> {
    Ok(LedgerEntry {
        key,
        sequence: row.int(0)?,
        blob: row.blob(1)?.to_vec(),
    })
}

/// Rows `[Bool is_latest, Int sequence]` of the range table.
///
/// The `is_latest` row marks a completed first ledger. Without it the
/// database is empty, even if an interrupted initialisation left a minimum
/// row behind. A lone maximum row, or an inverted pair, is corrupt.
pub fn decode_range(rows: &ResultSet) -> Result<Option<LedgerRange>, BackendError> {
    let mut min = None;
    let mut max = None;
    for row in &rows.rows {
        if row.boolean(0)? {
            max = Some(row.int(1)?);
        } else {
            min = Some(row.int(1)?);
        }
    }

    match (min, max) {
        (_, None) => Ok(None),
        (Some(min), Some(max)) => LedgerRange::new(min, max)
            .map(Some)
            .ok_or_else(|| BackendError::Corrupt(format!("stored range {min}-{max} is inverted"))),
        (None, Some(max)) => Err(BackendError::Corrupt(format!(
            "stored range has maximum {max} but no minimum"
        ))),
    }
}
