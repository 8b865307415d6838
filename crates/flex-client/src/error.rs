//! Error types for the Flex Web Service client.
//!
//! Only [`FlexError::GenerationPending`] is recoverable — the service
//! answers it while the statement is still being generated, and the client
//! retries on a fixed delay until its attempt budget runs out. Everything
//! else fails the run immediately.

use thiserror::Error;

/// Upstream error code meaning "statement generation in progress".
pub const GENERATION_IN_PROGRESS: &str = "1019";

/// Errors that can occur when fetching a Flex statement.
#[derive(Debug, Error)]
pub enum FlexError {
    /// Required connection parameters are absent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The statement is not ready yet; retried up to the attempt budget.
    #[error("statement generation in progress (code {code}): {message}")]
    GenerationPending {
        /// Upstream error code (1019).
        code: String,
        /// Upstream error message.
        message: String,
    },

    /// The service rejected the query outright.
    #[error("flex query rejected (code {code}): {message}")]
    Rejected {
        /// Upstream error code.
        code: String,
        /// Upstream error message.
        message: String,
    },

    /// The response body is missing expected columns or is not a statement.
    #[error("malformed statement: {0}")]
    Malformed(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),
}

impl FlexError {
    /// Classify an upstream error code: 1019 is pending, anything else is a
    /// hard rejection.
    pub fn upstream(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        if code == GENERATION_IN_PROGRESS {
            Self::GenerationPending { code, message }
        } else {
            Self::Rejected { code, message }
        }
    }

    /// True if another poll attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GenerationPending { .. })
    }
}

impl From<reqwest::Error> for FlexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timeout: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<flex_pnl_core::ConfigError> for FlexError {
    fn from(err: flex_pnl_core::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<flex_pnl_core::WireError> for FlexError {
    fn from(err: flex_pnl_core::WireError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type alias for Flex client operations.
pub type Result<T> = std::result::Result<T, FlexError>;
