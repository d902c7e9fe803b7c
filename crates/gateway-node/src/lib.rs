//! # Gateway Node Library
//!
//! Wiring for the `gateway-node` binary, exposed for tests.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (JSON file or defaults)
//! 2. Initialize logging and metrics
//! 3. Build the ledger backend (loads the persisted range)
//! 4. Start the range monitor (read-only nodes)
//! 5. Serve the API gateway until ctrl-c, then drain storage

pub mod config;
pub mod monitor;
pub mod runtime;

pub use config::{MonitorConfig, NodeConfig, NodeConfigError};
pub use monitor::RangeMonitor;
pub use runtime::NodeRuntime;
