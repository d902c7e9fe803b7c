//! # Ledger Range Tracking
//!
//! The backend's known-good contiguous range of fully persisted ledgers, and
//! the coverage reasoning that decides whether a negative lookup is
//! conclusive.
//!
//! ## Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Ordered bounds | `min <= max` whenever a range is present |
//! | Monotonic | neither bound ever decreases |
//! | Untorn reads | a snapshot always returns a pair that was published together |
//! | Write-then-publish | an extension is published only after its ledger is persisted |

use parking_lot::RwLock;
use shared_types::{LedgerRange, LedgerSequence};
use tokio::sync::broadcast;
use tracing::{debug, info};

use gateway_telemetry::{LEDGER_RANGE_MAX, LEDGER_RANGE_MIN};

use super::errors::RangeError;

// =============================================================================
// COVERAGE
// =============================================================================

/// How much of a requested window lies inside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// No overlap, or no range known at all.
    NotCovered,
    /// Some but not all requested sequences are known.
    PartiallyCovered,
    /// Every requested sequence is known.
    FullyCovered,
}

impl Coverage {
    pub fn is_full(&self) -> bool {
        matches!(self, Coverage::FullyCovered)
    }
}

/// Classify `[requested_min, requested_max]` against `known`.
pub fn coverage(
    requested_min: LedgerSequence,
    requested_max: LedgerSequence,
    known: Option<LedgerRange>,
) -> Result<Coverage, RangeError> {
    if requested_max < requested_min {
        return Err(RangeError::InvalidRange {
            min: requested_min,
            max: requested_max,
        });
    }

    let Some(known) = known else {
        return Ok(Coverage::NotCovered);
    };

    if requested_max < known.min_sequence || requested_min > known.max_sequence {
        Ok(Coverage::NotCovered)
    } else if known.min_sequence <= requested_min && requested_max <= known.max_sequence {
        Ok(Coverage::FullyCovered)
    } else {
        Ok(Coverage::PartiallyCovered)
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// Capacity of the extension broadcast; slow subscribers skip ahead.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Shared, monotonically growing ledger range.
///
/// One writer path (the backend's write or refresh logic) and many snapshot
/// readers. Every published change is also sent to subscribers.
pub struct RangeTracker {
    range: RwLock<Option<LedgerRange>>,
    updates: broadcast::Sender<LedgerRange>,
}

impl Default for RangeTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RangeTracker {
    pub fn new(initial: Option<LedgerRange>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        if let Some(range) = initial {
            record_gauges(range);
        }
        Self {
            range: RwLock::new(initial),
            updates,
        }
    }

    /// Current range, read atomically.
    pub fn snapshot(&self) -> Option<LedgerRange> {
        *self.range.read()
    }

    /// Receive every range published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerRange> {
        self.updates.subscribe()
    }

    /// Publish a newly persisted ledger.
    ///
    /// The first call seeds `{sequence, sequence}`; later calls must be
    /// strictly above the current maximum.
    pub fn extend(&self, sequence: LedgerSequence) -> Result<LedgerRange, RangeError> {
        let updated = {
            let mut guard = self.range.write();
            let updated = match *guard {
                None => LedgerRange::single(sequence),
                Some(current) if sequence > current.max_sequence => LedgerRange {
                    min_sequence: current.min_sequence,
                    max_sequence: sequence,
                },
                Some(current) => {
                    return Err(RangeError::NotIncreasing {
                        sequence,
                        max: current.max_sequence,
                    })
                }
            };
            *guard = Some(updated);
            updated
        };

        debug!(range = %updated, "Ledger range extended");
        self.publish(updated);
        Ok(updated)
    }

    /// Raise the minimum (pruning). Never past the maximum, never backwards.
    pub fn advance_min(&self, sequence: LedgerSequence) -> Result<LedgerRange, RangeError> {
        let updated = {
            let mut guard = self.range.write();
            let current = (*guard).ok_or(RangeError::Empty)?;
            check_advance_min(current, sequence)?;
            let updated = LedgerRange {
                min_sequence: sequence,
                max_sequence: current.max_sequence,
            };
            *guard = Some(updated);
            updated
        };

        info!(range = %updated, "Ledger range minimum advanced");
        self.publish(updated);
        Ok(updated)
    }

    /// Merge a range read from storage.
    ///
    /// Each bound only moves up; a stale read never shrinks what is already
    /// published. Returns the new range if anything changed.
    pub fn seed(&self, observed: LedgerRange) -> Option<LedgerRange> {
        let updated = {
            let mut guard = self.range.write();
            let merged = match *guard {
                None => observed,
                Some(current) => LedgerRange {
                    min_sequence: current.min_sequence.max(observed.min_sequence),
                    max_sequence: current.max_sequence.max(observed.max_sequence),
                },
            };
            if *guard == Some(merged) {
                return None;
            }
            *guard = Some(merged);
            merged
        };

        debug!(range = %updated, "Ledger range loaded from storage");
        self.publish(updated);
        Some(updated)
    }

    fn publish(&self, range: LedgerRange) {
        record_gauges(range);
        // No subscribers is fine
        let _ = self.updates.send(range);
    }
}

/// Validate a minimum advance against `current` without applying it.
pub fn check_advance_min(
    current: LedgerRange,
    sequence: LedgerSequence,
) -> Result<(), RangeError> {
    if sequence < current.min_sequence {
        return Err(RangeError::MinRegression {
            sequence,
            min: current.min_sequence,
        });
    }
    if sequence > current.max_sequence {
        return Err(RangeError::MinPastMax {
            sequence,
            max: current.max_sequence,
        });
    }
    Ok(())
}

fn record_gauges(range: LedgerRange) {
    LEDGER_RANGE_MIN.set(range.min_sequence as f64);
    LEDGER_RANGE_MAX.set(range.max_sequence as f64);
}
