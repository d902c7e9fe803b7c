//! # Core Ledger Entities
//!
//! ## Clusters
//!
//! - **Identity**: [`Hash256`], [`LedgerSequence`]
//! - **Consistency**: [`LedgerRange`]
//! - **Stored records**: [`TransactionAndMetadata`], [`LedgerEntry`], [`LedgerHeader`]

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;
use std::str::FromStr;

/// A ledger sequence number. Ledgers are numbered contiguously.
pub type LedgerSequence = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// A 256-bit identifier (transaction hash, ledger hash, entry key).
///
/// Serializes as a 64 character upper-case hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub const ZERO: Hash256 = Hash256([0u8; 32]);

    /// First half of SHA-512 over `data`.
    pub fn digest(data: &[u8]) -> Self {
        let full = Sha512::digest(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&full[..32]);
        Hash256(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Build from a byte slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashParseError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HashParseError::Length(bytes.len() * 2))?;
        Ok(Hash256(arr))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// Failure to parse a [`Hash256`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashParseError {
    #[error("expected 64 hex characters, got {0}")]
    Length(usize),
    #[error("invalid hex: {0}")]
    Hex(String),
}

impl FromStr for Hash256 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(HashParseError::Length(s.len()));
        }
        let bytes = hex::decode(s).map_err(|e| HashParseError::Hex(e.to_string()))?;
        Hash256::from_slice(&bytes)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// CONSISTENCY
// =============================================================================

/// Inclusive range of sequences known to be fully persisted and consistent.
///
/// Invariant: `min_sequence <= max_sequence`. An empty backend has no range at
/// all (`Option<LedgerRange>::None`), never an inverted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerRange {
    pub min_sequence: LedgerSequence,
    pub max_sequence: LedgerSequence,
}

impl LedgerRange {
    /// Returns `None` when `min > max`.
    pub fn new(min_sequence: LedgerSequence, max_sequence: LedgerSequence) -> Option<Self> {
        (min_sequence <= max_sequence).then_some(Self {
            min_sequence,
            max_sequence,
        })
    }

    /// Range holding a single sequence.
    pub fn single(sequence: LedgerSequence) -> Self {
        Self {
            min_sequence: sequence,
            max_sequence: sequence,
        }
    }

    pub fn contains(&self, sequence: LedgerSequence) -> bool {
        self.min_sequence <= sequence && sequence <= self.max_sequence
    }

    /// Number of ledgers in the range.
    pub fn ledger_count(&self) -> u64 {
        self.max_sequence - self.min_sequence + 1
    }
}

impl fmt::Display for LedgerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min_sequence, self.max_sequence)
    }
}

// =============================================================================
// STORED RECORDS
// =============================================================================

/// A transaction blob, its metadata blob and where it was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAndMetadata {
    pub transaction: Vec<u8>,
    pub metadata: Vec<u8>,
    pub ledger_sequence: LedgerSequence,
    /// Close time of the containing ledger, seconds since the network epoch.
    pub date: u64,
}

impl TransactionAndMetadata {
    /// Content hash of the transaction blob.
    pub fn hash(&self) -> Hash256 {
        Hash256::digest(&self.transaction)
    }
}

/// One version of a ledger state entry.
///
/// An empty `blob` marks the entry as deleted at `sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: Hash256,
    pub sequence: LedgerSequence,
    pub blob: Vec<u8>,
}

impl LedgerEntry {
    pub fn is_deleted(&self) -> bool {
        self.blob.is_empty()
    }
}

/// Header of a closed ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub sequence: LedgerSequence,
    pub hash: Hash256,
    pub parent_hash: Hash256,
    pub close_time: u64,
}

impl fmt::Display for LedgerHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LedgerHeader {{ Sequence : {} Hash : {} ParentHash : {} }}",
            self.sequence, self.hash, self.parent_hash
        )
    }
}
