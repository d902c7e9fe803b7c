//! # Operation Descriptor
//!
//! An [`Operation`] names one logical storage request: which statement to run
//! ([`Query`]) and the values bound to its placeholders. It is immutable once
//! built; the executor resubmits the very same descriptor on every attempt.

use std::fmt;
use thiserror::Error;

// =============================================================================
// QUERY IDENTITY
// =============================================================================

/// Statements understood by the storage cluster.
///
/// Parameter layouts are positional and listed per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// `[Blob hash]` → rows `[Blob tx, Blob meta, Int sequence, Int date]`
    SelectTransaction,
    /// `[Blob hash, Blob tx, Blob meta, Int sequence, Int date]`
    InsertTransaction,
    /// `[Blob key, Int sequence]` → newest version at or below `sequence`,
    /// rows `[Int sequence, Blob blob]`
    SelectEntry,
    /// `[Blob key, Int sequence, Blob blob]`
    InsertEntry,
    /// `[Int sequence]` → rows `[Blob header]`
    SelectLedgerHeader,
    /// `[Int sequence, Blob header]`
    InsertLedgerHeader,
    /// `[]` → rows `[Bool is_latest, Int sequence]`
    SelectLedgerRange,
    /// `[Int sequence]`, sets both rows to `sequence` in one step, applied
    /// only while the `is_latest` row is absent. Re-applying the same
    /// sequence is a no-op that still reports applied.
    InitLedgerRange,
    /// `[Int sequence, Bool is_latest, Int expected]`, applied only if the
    /// stored sequence equals `expected`
    UpdateLedgerRange,
}

impl Query {
    /// Read or write class of the statement.
    pub fn class(&self) -> OperationClass {
        match self {
            Query::SelectTransaction
            | Query::SelectEntry
            | Query::SelectLedgerHeader
            | Query::SelectLedgerRange => OperationClass::Read,
            Query::InsertTransaction
            | Query::InsertEntry
            | Query::InsertLedgerHeader
            | Query::InitLedgerRange
            | Query::UpdateLedgerRange => OperationClass::Write,
        }
    }

    /// Number of bound parameters the statement expects.
    pub fn arity(&self) -> usize {
        match self {
            Query::SelectLedgerRange => 0,
            Query::SelectTransaction | Query::SelectLedgerHeader | Query::InitLedgerRange => 1,
            Query::SelectEntry | Query::InsertLedgerHeader => 2,
            Query::InsertEntry | Query::UpdateLedgerRange => 3,
            Query::InsertTransaction => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Query::SelectTransaction => "select_transaction",
            Query::InsertTransaction => "insert_transaction",
            Query::SelectEntry => "select_entry",
            Query::InsertEntry => "insert_entry",
            Query::SelectLedgerHeader => "select_ledger_header",
            Query::InsertLedgerHeader => "insert_ledger_header",
            Query::SelectLedgerRange => "select_ledger_range",
            Query::InitLedgerRange => "init_ledger_range",
            Query::UpdateLedgerRange => "update_ledger_range",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-class or write-class. Write-class operations are rejected on
/// read-only nodes and are bounded by a separate outstanding-request limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    Read,
    Write,
}

impl OperationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationClass::Read => "read",
            OperationClass::Write => "write",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// VALUES & ROWS
// =============================================================================

/// A bound parameter or a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Blob(Vec<u8>),
    Int(u64),
    Bool(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Blob(_) => "blob",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Failure to read a typed column out of a [`Row`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("column {index} missing (row has {len} columns)")]
    Missing { index: usize, len: usize },
    #[error("column {index} is {actual}, expected {expected}")]
    Type {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub columns: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<Value>) -> Self {
        Self { columns }
    }

    fn column(&self, index: usize) -> Result<&Value, RowError> {
        self.columns.get(index).ok_or(RowError::Missing {
            index,
            len: self.columns.len(),
        })
    }

    pub fn blob(&self, index: usize) -> Result<&[u8], RowError> {
        match self.column(index)? {
            Value::Blob(b) => Ok(b),
            other => Err(RowError::Type {
                index,
                expected: "blob",
                actual: other.type_name(),
            }),
        }
    }

    pub fn int(&self, index: usize) -> Result<u64, RowError> {
        match self.column(index)? {
            Value::Int(v) => Ok(*v),
            other => Err(RowError::Type {
                index,
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool, RowError> {
        match self.column(index)? {
            Value::Bool(v) => Ok(*v),
            other => Err(RowError::Type {
                index,
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }
}

/// Payload of a successful completion.
///
/// `applied` is false only for a conditional write whose condition did not
/// hold; every unconditional statement reports `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    pub applied: bool,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            applied: true,
        }
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            applied: true,
        }
    }

    pub fn not_applied() -> Self {
        Self {
            rows: Vec::new(),
            applied: false,
        }
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Immutable description of one logical storage request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    query: Query,
    params: Vec<Value>,
}

impl Operation {
    pub fn new(query: Query, params: Vec<Value>) -> Self {
        Self { query, params }
    }

    pub fn query(&self) -> Query {
        self.query
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn class(&self) -> OperationClass {
        self.query.class()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} params)", self.query, self.params.len())
    }
}
