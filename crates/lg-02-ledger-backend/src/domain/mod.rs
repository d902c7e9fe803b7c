//! Domain layer: range tracking, windows, records, errors.

pub mod errors;
pub mod range;
pub mod records;
pub mod window;
