//! # Domain Errors
//!
//! Error types for the ledger backend.
//!
//! - [`RangeError`]: caller-supplied windows and tracker updates
//! - [`BackendError`]: every facade operation; [`BackendError::kind`] maps it
//!   onto the protocol-neutral [`ErrorKind`]

use lg_01_storage_executor::{ConfigError, ErrorCode, RowError, StorageError};
use shared_types::{ErrorKind, LedgerRange, LedgerSequence};
use thiserror::Error;

/// Range validation and tracker update failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `max < min` in a caller-supplied window.
    #[error("ledger range is invalid: {min} > {max}")]
    InvalidRange {
        min: LedgerSequence,
        max: LedgerSequence,
    },

    /// A caller-supplied window spans more ledgers than allowed.
    #[error("ledger range spans {span} ledgers, limit is {max_span}")]
    RangeExceeded { span: u64, max_span: u64 },

    /// Extension not strictly above the current maximum.
    #[error("sequence {sequence} does not extend range ending at {max}")]
    NotIncreasing {
        sequence: LedgerSequence,
        max: LedgerSequence,
    },

    /// Write would leave a gap after the current maximum.
    #[error("ledger {sequence} is not contiguous, next ledger is {expected}")]
    NotContiguous {
        sequence: LedgerSequence,
        expected: LedgerSequence,
    },

    /// Minimum moved backwards.
    #[error("sequence {sequence} is below current minimum {min}")]
    MinRegression {
        sequence: LedgerSequence,
        min: LedgerSequence,
    },

    /// Minimum moved past the maximum.
    #[error("sequence {sequence} is above current maximum {max}")]
    MinPastMax {
        sequence: LedgerSequence,
        max: LedgerSequence,
    },

    /// Operation needs a range but none is known yet.
    #[error("no ledger range is known")]
    Empty,
}

/// Errors returned by the backend facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Requested ledger lies outside the known range or was never stored.
    #[error("ledger {sequence} not found (available: {available})")]
    LedgerNotFound {
        sequence: LedgerSequence,
        available: String,
    },

    /// The backend holds no ledgers yet.
    #[error("backend has no ledgers")]
    Empty,

    /// Write attempted on a read-only node.
    #[error("node is read-only")]
    ReadOnly,

    /// The persisted range row no longer held the expected value.
    #[error("ledger range row changed concurrently (expected {expected:?})")]
    RangeConflict { expected: Option<LedgerSequence> },

    /// Malformed ledger write supplied by the caller.
    #[error("invalid ledger write: {0}")]
    InvalidWrite(String),

    /// A stored record could not be decoded.
    #[error("malformed stored record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error("unknown database type '{0}'")]
    UnknownDatabase(String),

    #[error("read-only backend requires a populated database")]
    EmptyReadOnly,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BackendError {
    pub(crate) fn ledger_not_found(sequence: LedgerSequence, range: Option<LedgerRange>) -> Self {
        BackendError::LedgerNotFound {
            sequence,
            available: range.map_or_else(|| "empty".to_string(), |r| r.to_string()),
        }
    }

    /// Protocol-neutral class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Range(RangeError::RangeExceeded { .. }) => ErrorKind::RangeExceeded,
            BackendError::Range(RangeError::Empty) => ErrorKind::Unavailable,
            BackendError::Range(_) | BackendError::InvalidWrite(_) => ErrorKind::InvalidRequest,
            BackendError::LedgerNotFound { .. } => ErrorKind::NotFound,
            BackendError::Empty => ErrorKind::Unavailable,
            BackendError::ReadOnly => ErrorKind::InvalidRequest,
            BackendError::Storage(e) if e.is_transient() => ErrorKind::Unavailable,
            BackendError::Storage(e) => match e.code() {
                ErrorCode::ShuttingDown => ErrorKind::Unavailable,
                ErrorCode::ReadOnly => ErrorKind::InvalidRequest,
                _ => ErrorKind::Internal,
            },
            BackendError::RangeConflict { .. }
            | BackendError::Corrupt(_)
            | BackendError::UnknownDatabase(_)
            | BackendError::EmptyReadOnly
            | BackendError::Config(_) => ErrorKind::Internal,
        }
    }
}

impl From<StorageError> for BackendError {
    fn from(err: StorageError) -> Self {
        if err.code() == ErrorCode::ReadOnly {
            BackendError::ReadOnly
        } else {
            BackendError::Storage(err)
        }
    }
}

impl From<RowError> for BackendError {
    fn from(err: RowError) -> Self {
        BackendError::Corrupt(err.to_string())
    }
}

impl From<bincode::Error> for BackendError {
    fn from(err: bincode::Error) -> Self {
        BackendError::Corrupt(err.to_string())
    }
}
