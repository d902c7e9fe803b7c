//! Request parameters and result shapes for the ledger methods.
//!
//! Blobs go over the wire as upper-case hex, hashes as 64 hex characters and
//! ledger sequences as plain JSON numbers.

use serde::{Deserialize, Serialize};
use shared_types::{Hash256, LedgerHeader, LedgerRange, LedgerSequence};
use std::fmt;

// =============================================================================
// JSON-RPC ENVELOPE
// =============================================================================

/// JSON-RPC request ID type
///
/// Per JSON-RPC 2.0 the ID can be string, number, or null. Null IDs are
/// rejected since they mark notifications, which get no response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    String(String),
    Number(i64),
}

impl JsonRpcId {
    /// Rejects empty strings and strings longer than 256 chars.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            JsonRpcId::String(s) => {
                if s.is_empty() {
                    Err("request ID cannot be empty string")
                } else if s.len() > 256 {
                    Err("request ID string too long (max 256 chars)")
                } else {
                    Ok(())
                }
            }
            JsonRpcId::Number(_) => Ok(()),
        }
    }
}

impl fmt::Display for JsonRpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonRpcId::String(s) => write!(f, "\"{}\"", s),
            JsonRpcId::Number(n) => write!(f, "{}", n),
        }
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// `tx` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxParams {
    pub transaction: Hash256,
    #[serde(default)]
    pub min_ledger: Option<LedgerSequence>,
    #[serde(default)]
    pub max_ledger: Option<LedgerSequence>,
    /// Return blobs as hex only, never decoded.
    #[serde(default)]
    pub binary: bool,
}

/// `ledger_entry` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerEntryParams {
    pub index: Hash256,
    /// Defaults to the newest known ledger.
    #[serde(default)]
    pub ledger_index: Option<LedgerSequence>,
}

/// `ledger` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LedgerParams {
    /// Defaults to the newest known ledger.
    #[serde(default)]
    pub ledger_index: Option<LedgerSequence>,
}

/// `subscribe` / `unsubscribe` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamParams {
    #[serde(default)]
    pub streams: Vec<String>,
}

// =============================================================================
// RESULTS
// =============================================================================

/// `tx` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxResult {
    pub hash: Hash256,
    pub ledger_index: LedgerSequence,
    pub date: u64,
    pub tx: serde_json::Value,
    pub meta: serde_json::Value,
    pub validated: bool,
}

/// `ledger_range` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerRangeResult {
    pub ledger_min: LedgerSequence,
    pub ledger_max: LedgerSequence,
}

impl From<LedgerRange> for LedgerRangeResult {
    fn from(range: LedgerRange) -> Self {
        Self {
            ledger_min: range.min_sequence,
            ledger_max: range.max_sequence,
        }
    }
}

/// `server_info` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfoResult {
    /// `"min-max"`, or `"empty"` before the first ledger
    pub complete_ledgers: String,
    pub read_only: bool,
    pub build_version: String,
}

/// `ledger_entry` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntryResult {
    pub index: Hash256,
    pub ledger_index: LedgerSequence,
    pub node_binary: String,
}

/// Header fields of a closed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerInfo {
    pub ledger_index: LedgerSequence,
    pub ledger_hash: Hash256,
    pub parent_hash: Hash256,
    pub close_time: u64,
}

impl From<LedgerHeader> for LedgerInfo {
    fn from(header: LedgerHeader) -> Self {
        Self {
            ledger_index: header.sequence,
            ledger_hash: header.hash,
            parent_hash: header.parent_hash,
            close_time: header.close_time,
        }
    }
}

/// `ledger` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerResult {
    pub ledger: LedgerInfo,
    pub ledger_index: LedgerSequence,
    pub validated: bool,
}

/// Payload pushed to `ledger` stream subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerClosed {
    #[serde(rename = "type")]
    pub kind: String,
    pub ledger_index: LedgerSequence,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ledger_hash: Option<Hash256>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ledger_time: Option<u64>,
    pub validated_ledgers: String,
}

impl LedgerClosed {
    pub const KIND: &'static str = "ledgerClosed";

    /// Announcement for the newest ledger of `range`, with header fields when
    /// the header could be read.
    pub fn new(range: LedgerRange, header: Option<&LedgerHeader>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            ledger_index: range.max_sequence,
            ledger_hash: header.map(|h| h.hash),
            ledger_time: header.map(|h| h.close_time),
            validated_ledgers: range.to_string(),
        }
    }
}

/// Upper-case hex rendering of a stored blob.
pub fn blob_hex(blob: &[u8]) -> String {
    hex::encode_upper(blob)
}
