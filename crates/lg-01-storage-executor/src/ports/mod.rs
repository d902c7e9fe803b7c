//! Ports (interfaces) for the storage executor.

pub mod outbound;
