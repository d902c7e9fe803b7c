//! Adapters implementing the storage connection port.

pub mod faulty;
pub mod memory;
