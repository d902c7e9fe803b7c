//! API Gateway error types with JSON-RPC 2.0 error codes.
//!
//! Every error object carries a ledger error token in `data.error`
//! (`txnNotFound`, `lgrNotFound`, ...) next to the numeric JSON-RPC code, so
//! clients can match on either.

use lg_02_ledger_backend::BackendError;
use serde::{Deserialize, Serialize};
use shared_types::ErrorKind;
use std::fmt;

/// Standard JSON-RPC 2.0 error codes
pub mod codes {
    // JSON-RPC 2.0 standard errors (-32700 to -32600)
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    pub const LIMIT_EXCEEDED: i32 = -32005;
}

/// Ledger error tokens carried in `data.error`
pub mod tokens {
    pub const INVALID_PARAMS: &str = "invalidParams";
    pub const INVALID_LGR_RANGE: &str = "invalidLgrRange";
    pub const EXCESSIVE_LGR_RANGE: &str = "excessiveLgrRange";
    pub const TXN_NOT_FOUND: &str = "txnNotFound";
    pub const ENTRY_NOT_FOUND: &str = "entryNotFound";
    pub const LGR_NOT_FOUND: &str = "lgrNotFound";
    pub const MALFORMED_STREAM: &str = "malformedStream";
    pub const NOT_READY: &str = "notReady";
    pub const TOO_BUSY: &str = "tooBusy";
    pub const INTERNAL: &str = "internal";
}

/// API Gateway error with JSON-RPC code
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// JSON-RPC error code
    pub code: i32,
    /// Human readable message
    pub message: String,
    /// Optional additional data
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error tagged with a ledger error token.
    pub fn ledger(code: i32, token: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(serde_json::json!({ "error": token })),
        }
    }

    /// Attach an extra field to `data`.
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let data = self
            .data
            .get_or_insert_with(|| serde_json::Value::Object(Default::default()));
        if let Some(map) = data.as_object_mut() {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Ledger error token, if any.
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref()?.get("error")?.as_str()
    }

    // Standard JSON-RPC errors

    /// Parse error - invalid JSON
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - not a valid JSON-RPC request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Invalid parameters
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::ledger(
            codes::INVALID_PARAMS,
            tokens::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::ledger(
            codes::INTERNAL_ERROR,
            tokens::INTERNAL,
            format!("Internal error: {}", details.into()),
        )
    }

    /// Limit exceeded (batch size, message size)
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }

    // Ledger errors

    pub fn invalid_ledger_range() -> Self {
        Self::ledger(
            codes::INVALID_PARAMS,
            tokens::INVALID_LGR_RANGE,
            "Ledger range is invalid.",
        )
    }

    pub fn excessive_ledger_range(max_span: u64) -> Self {
        Self::ledger(
            codes::LIMIT_EXCEEDED,
            tokens::EXCESSIVE_LGR_RANGE,
            format!("Ledger range exceeds {max_span}."),
        )
    }

    pub fn transaction_not_found() -> Self {
        Self::ledger(
            codes::RESOURCE_NOT_FOUND,
            tokens::TXN_NOT_FOUND,
            "Transaction not found.",
        )
    }

    pub fn entry_not_found() -> Self {
        Self::ledger(
            codes::RESOURCE_NOT_FOUND,
            tokens::ENTRY_NOT_FOUND,
            "Entry not found.",
        )
    }

    pub fn ledger_not_found() -> Self {
        Self::ledger(
            codes::RESOURCE_NOT_FOUND,
            tokens::LGR_NOT_FOUND,
            "Ledger not found.",
        )
    }

    pub fn malformed_stream() -> Self {
        Self::ledger(
            codes::INVALID_PARAMS,
            tokens::MALFORMED_STREAM,
            "Stream malformed.",
        )
    }

    pub fn not_ready() -> Self {
        Self::ledger(
            codes::RESOURCE_UNAVAILABLE,
            tokens::NOT_READY,
            "Not ready to handle this request.",
        )
    }

    pub fn too_busy() -> Self {
        Self::ledger(
            codes::RESOURCE_UNAVAILABLE,
            tokens::TOO_BUSY,
            "The server is too busy to help you now.",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 3)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for ApiError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ErrorHelper {
            code: i32,
            message: String,
            data: Option<serde_json::Value>,
        }

        let helper = ErrorHelper::deserialize(deserializer)?;
        Ok(ApiError {
            code: helper.code,
            message: helper.message,
            data: helper.data,
        })
    }
}

// Conversions from common error types

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            ApiError::parse_error(e.to_string())
        } else {
            ApiError::invalid_params(e.to_string())
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        match e.kind() {
            ErrorKind::NotFound => ApiError::ledger_not_found(),
            ErrorKind::InvalidRequest => ApiError::invalid_params(e.to_string()),
            ErrorKind::RangeExceeded => ApiError::ledger(
                codes::LIMIT_EXCEEDED,
                tokens::EXCESSIVE_LGR_RANGE,
                e.to_string(),
            ),
            ErrorKind::Unavailable => match e {
                BackendError::Storage(ref storage) if storage.is_transient() => {
                    ApiError::too_busy()
                }
                _ => ApiError::not_ready(),
            },
            ErrorKind::Internal => ApiError::internal(e.to_string()),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (not JSON-RPC, internal use)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// A server task stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}
