//! # Shared Types Crate
//!
//! Ledger primitives used across the gateway workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, sequences and ledger ranges are
//!   defined once here and reused by the executor, backend and gateway.
//! - **Append-only records**: a stored transaction or entry version is never
//!   mutated after it is written for a given key and sequence.
//! - **Protocol-neutral errors**: [`ErrorKind`] is the abstract error taxonomy
//!   handed to the protocol layer; wire codes live in the gateway.

pub mod duration_serde;
pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
