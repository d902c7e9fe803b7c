//! Adapters between storage rows and domain records.

pub mod codec;
