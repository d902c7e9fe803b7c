//! Caller-supplied search windows.

use shared_types::LedgerSequence;

use super::errors::RangeError;

/// Widest window a caller may search, in `max - min`.
pub const DEFAULT_MAX_SPAN: u64 = 1000;

/// A validated `[min, max]` window of ledgers to search.
///
/// Construction rejects inverted and oversized windows, so nothing invalid
/// ever reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerWindow {
    min: LedgerSequence,
    max: LedgerSequence,
}

impl LedgerWindow {
    pub fn new(
        min: LedgerSequence,
        max: LedgerSequence,
        max_span: u64,
    ) -> Result<Self, RangeError> {
        if max < min {
            return Err(RangeError::InvalidRange { min, max });
        }
        let span = max - min;
        if span > max_span {
            return Err(RangeError::RangeExceeded { span, max_span });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> LedgerSequence {
        self.min
    }

    pub fn max(&self) -> LedgerSequence {
        self.max
    }
}
