//! Domain layer for the API Gateway.

pub mod config;
pub mod error;
pub mod methods;
pub mod types;

pub use config::*;
pub use error::*;
pub use methods::*;
pub use types::*;
