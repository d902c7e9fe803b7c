//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use shared_types::duration_serde;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use lg_02_ledger_backend::DEFAULT_MAX_SPAN;

/// Main gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP JSON-RPC server
    pub http: HttpConfig,
    /// WebSocket server (JSON-RPC plus streams)
    pub websocket: WebSocketConfig,
    /// Admin server (localhost only by default)
    pub admin: AdminConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let enabled: Vec<u16> = [
            (self.http.enabled, self.http.port),
            (self.websocket.enabled, self.websocket.port),
            (self.admin.enabled, self.admin.port),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, port)| *port)
        .collect();
        let unique: HashSet<_> = enabled.iter().collect();
        if unique.len() != enabled.len() {
            return Err(ConfigError::DuplicatePorts);
        }

        if self.http.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "http.request_timeout cannot be 0".into(),
            ));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.limits.max_batch_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_batch_size cannot be 0".into(),
            ));
        }

        if self.websocket.max_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "websocket.max_message_size cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Get WebSocket server bind address
    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.websocket.host, self.websocket.port)
    }

    /// Get Admin server bind address
    pub fn admin_addr(&self) -> SocketAddr {
        SocketAddr::new(self.admin.host, self.admin.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    /// Port (default: 51234)
    pub port: u16,
    pub enabled: bool,
    /// Whole-request deadline, answered with 408 when exceeded
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Allow cross-origin browser clients
    pub cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 51234,
            enabled: true,
            request_timeout: Duration::from_secs(10),
            cors: true,
        }
    }
}

/// WebSocket server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    pub host: IpAddr,
    /// Port (default: 51233)
    pub port: u16,
    pub enabled: bool,
    /// Largest accepted inbound message in bytes
    pub max_message_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 51233,
            enabled: true,
            max_message_size: 1024 * 1024,
        }
    }
}

/// Admin server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bind address (localhost only by default)
    pub host: IpAddr,
    /// Port (default: 9100)
    pub port: u16,
    pub enabled: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 9100,
            enabled: true,
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 1MB)
    pub max_request_size: usize,
    /// Max number of requests in one batch
    pub max_batch_size: usize,
    /// Widest `min_ledger..max_ledger` window a `tx` lookup may search
    pub max_ledger_span: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
            max_batch_size: 100,
            max_ledger_span: DEFAULT_MAX_SPAN,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Multiple enabled servers using the same port
    #[error("duplicate ports configured")]
    DuplicatePorts,
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
