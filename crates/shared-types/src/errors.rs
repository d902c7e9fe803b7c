//! # Error Types
//!
//! Protocol-neutral error taxonomy surfaced by the backend to the RPC layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract error class handed to the protocol layer.
///
/// The gateway maps each kind onto a wire code; the backend only decides which
/// kind a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested object does not exist (or the ledger is not available).
    NotFound,
    /// Caller input was rejected before reaching storage.
    InvalidRequest,
    /// A caller-supplied search window is wider than allowed.
    RangeExceeded,
    /// Storage could not answer (retries exhausted, backend empty, read-only).
    Unavailable,
    /// Anything else; a bug or a malformed stored record.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::RangeExceeded => "range_exceeded",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Operational mode of a gateway node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeMode {
    /// Serves queries and accepts ledger writes.
    ReadWrite,
    /// Serves queries only; every write is rejected.
    ReadOnly,
}

impl NodeMode {
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            NodeMode::ReadOnly
        } else {
            NodeMode::ReadWrite
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, NodeMode::ReadOnly)
    }
}
