//! Pure domain logic for storage execution.

pub mod errors;
pub mod operation;
pub mod outcome;
pub mod retry;
