//! # Ledger Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! └── src/
//!     ├── fixtures.rs   # Deterministic ledgers and an HTTP JSON-RPC client
//!     └── integration/  # Gateway → backend → executor → cluster flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lg-tests
//! cargo bench -p lg-tests
//! ```

pub mod fixtures;
pub mod integration;
