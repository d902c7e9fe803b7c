//! # Ledger Backend (lg-02)
//!
//! Turns raw per-row storage reads into a ledger-range-consistent view that
//! RPC handlers can trust.
//!
//! ## Architecture
//!
//! ```text
//! RPC handler ──→ LedgerBackendApi ──→ AsyncExecutor (lg-01) ──→ cluster
//!                       │
//!                       └── RangeTracker (snapshot / extend / subscribe)
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Monotonic range | published min and max only ever increase |
//! | Publish after persist | a ledger joins the range only once fully written |
//! | Honest negatives | "not found" is exhaustive only when the search window is fully covered |
//! | Early rejection | invalid or oversized windows never reach storage |
//! | Read-only | write calls on a read-only node fail on every call |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Range tracking, coverage, windows, records, errors
//! - `ports/` - The inbound API trait
//! - `adapters/` - Row and blob codecs
//! - `service.rs` - The backend facade
//! - `factory.rs` - Construction from configuration
//!
//! ## Usage
//!
//! ```ignore
//! use lg_02_ledger_backend::{make_backend, BackendConfig, LedgerBackendApi};
//!
//! let backend = make_backend(&BackendConfig::default()).await?;
//! let lookup = backend.fetch_transaction(hash, None).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod factory;
pub mod ports;
pub mod service;

pub use domain::errors::{BackendError, RangeError};
pub use domain::range::{coverage, Coverage, RangeTracker};
pub use domain::records::{LedgerWrite, TransactionLookup};
pub use domain::window::{LedgerWindow, DEFAULT_MAX_SPAN};
pub use factory::{make_backend, make_connection, BackendConfig, DatabaseConfig};
pub use ports::inbound::LedgerBackendApi;
pub use service::LedgerBackend;
