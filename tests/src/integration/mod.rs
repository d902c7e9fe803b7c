//! Cross-crate flows.

pub mod read_only;
pub mod rpc_flows;
pub mod storage_faults;
