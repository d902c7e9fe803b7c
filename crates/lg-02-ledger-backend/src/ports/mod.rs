//! Ports (interfaces) for the ledger backend.

pub mod inbound;
