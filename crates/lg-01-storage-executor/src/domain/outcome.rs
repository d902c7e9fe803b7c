//! # Outcome Classification
//!
//! Every raw completion from the connection is sorted into exactly one of
//! success, transient failure (eligible for retry) or fatal failure (surfaced
//! immediately). [`classify`] is pure; the policy decides what to do with a
//! transient one.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::operation::ResultSet;

/// Driver-level error codes reported by the storage cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Transient
    /// The coordinator did not answer within the request timeout.
    RequestTimedOut,
    /// No replica of the partition was reachable.
    NodeUnavailable,
    /// The coordinator shed load.
    Overloaded,
    /// Not enough replicas answered a read in time.
    ReadTimeout,
    /// Not enough replicas acknowledged a write in time.
    WriteTimeout,

    // Fatal
    /// Statement or bound parameters were rejected.
    InvalidQuery,
    SyntaxError,
    Unauthorized,
    /// Unclassified server-side failure.
    ServerError,
    /// Write-class operation attempted on a read-only node.
    ReadOnly,
    /// Contract violation inside the process (e.g. a dropped completion).
    Internal,
    /// The executor is draining and accepts no new operations.
    ShuttingDown,
}

impl ErrorCode {
    /// Whether a failure with this code may succeed when resubmitted.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorCode::RequestTimedOut
                | ErrorCode::NodeUnavailable
                | ErrorCode::Overloaded
                | ErrorCode::ReadTimeout
                | ErrorCode::WriteTimeout
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequestTimedOut => "request_timed_out",
            ErrorCode::NodeUnavailable => "node_unavailable",
            ErrorCode::Overloaded => "overloaded",
            ErrorCode::ReadTimeout => "read_timeout",
            ErrorCode::WriteTimeout => "write_timeout",
            ErrorCode::InvalidQuery => "invalid_query",
            ErrorCode::SyntaxError => "syntax_error",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::ServerError => "server_error",
            ErrorCode::ReadOnly => "read_only",
            ErrorCode::Internal => "internal",
            ErrorCode::ShuttingDown => "shutting_down",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw failure reported by a connection for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl StorageFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A classified completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(ResultSet),
    Transient(StorageFailure),
    Fatal(StorageFailure),
}

/// Sort a raw completion into success, transient or fatal.
pub fn classify(raw: Result<ResultSet, StorageFailure>) -> Outcome {
    match raw {
        Ok(rows) => Outcome::Success(rows),
        Err(failure) if failure.code.is_transient() => Outcome::Transient(failure),
        Err(failure) => Outcome::Fatal(failure),
    }
}
