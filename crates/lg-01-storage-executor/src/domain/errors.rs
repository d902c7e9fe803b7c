//! # Domain Errors
//!
//! Terminal errors delivered by the executor, and configuration errors.

use thiserror::Error;

use super::outcome::{ErrorCode, StorageFailure};

/// Terminal failure of one logical storage operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Transient failure the retry policy gave up on. Carries the last
    /// failure the connection actually reported.
    #[error("storage request failed after {attempts} attempt(s): {code}: {message}")]
    Transient {
        code: ErrorCode,
        message: String,
        attempts: u32,
    },

    /// Non-retryable failure, surfaced on the attempt that produced it.
    #[error("storage request rejected: {code}: {message}")]
    Fatal { code: ErrorCode, message: String },
}

impl StorageError {
    pub fn fatal(code: ErrorCode, message: impl Into<String>) -> Self {
        StorageError::Fatal {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn exhausted(failure: StorageFailure, attempts: u32) -> Self {
        StorageError::Transient {
            code: failure.code,
            message: failure.message,
            attempts,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StorageError::Transient { code, .. } | StorageError::Fatal { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StorageError::Transient { message, .. } | StorageError::Fatal { message, .. } => {
                message
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient { .. })
    }
}

impl From<StorageFailure> for StorageError {
    fn from(failure: StorageFailure) -> Self {
        StorageError::Fatal {
            code: failure.code,
            message: failure.message,
        }
    }
}

/// Invalid executor or cluster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to start completion pool: {0}")]
    ThreadPool(String),
}
