//! LG-03 API Gateway - JSON-RPC over HTTP and WebSocket for ledger reads.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    API GATEWAY (lg-03)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐       │
//! │  │  HTTP/RPC   │  │  WebSocket  │  │    Admin    │       │
//! │  │ Port 51234  │  │ Port 51233  │  │  Port 9100  │       │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘       │
//! │         │                │                │              │
//! │  ┌──────┴────────────────┴──────┐   /health, /metrics    │
//! │  │  Router (envelope, batches)  │                        │
//! │  └──────────────┬───────────────┘                        │
//! │                 │                                        │
//! │  ┌──────────────┴───────────────┐                        │
//! │  │  RpcHandlers (tx, ledger...) │                        │
//! │  └──────────────┬───────────────┘                        │
//! └─────────────────┼────────────────────────────────────────┘
//!                   ▼
//!          lg-02 LedgerBackendApi
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lg_03_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), backend)?;
//! service.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod router;
pub mod rpc;
pub mod service;
pub mod ws;

// Re-exports for public API
pub use domain::config::{GatewayConfig, LimitsConfig};
pub use domain::error::{codes, tokens, ApiError, ApiResult, GatewayError};
pub use domain::methods::{get_method_info, is_method_supported, MethodInfo, Stream, Transport};
pub use domain::types::*;
pub use router::AppState;
pub use rpc::RpcHandlers;
pub use service::ApiGatewayService;
pub use ws::{spawn_ledger_publisher, SubscriptionManager, WebSocketHandler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_method_support() {
        assert!(is_method_supported("tx"));
        assert!(is_method_supported("ledger_range"));
        assert!(is_method_supported("subscribe"));
        assert!(!is_method_supported("account_info"));
    }
}
