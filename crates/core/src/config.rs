//! Flex Web Service configuration.
//!
//! Built once at process start and validated eagerly — a missing credential
//! fails immediately with a descriptive error instead of surfacing as a
//! rejected request mid-run.

use thiserror::Error;

/// Default Flex Web Service base URL.
pub const DEFAULT_BASE_URL: &str =
    "https://ndcdyn.interactivebrokers.com/AccountManagement/FlexWebService";

/// A required configuration value is absent or empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing configuration: set the {var} environment variable")]
pub struct ConfigError {
    /// Environment variable that was not set.
    pub var: &'static str,
}

/// Connection parameters for the Flex Web Service.
#[derive(Debug, Clone)]
pub struct FlexConfig {
    /// Flex Web Service token.
    pub token: String,
    /// Saved Flex query id.
    pub query_id: String,
    /// Flex API version (currently "3").
    pub flex_version: String,
    /// Service base URL (override for tests).
    pub base_url: String,
    /// Maximum statement-poll attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between poll attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl FlexConfig {
    /// Build a configuration with default polling parameters.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if any credential is empty.
    pub fn new(
        token: impl Into<String>,
        query_id: impl Into<String>,
        flex_version: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            token: token.into(),
            query_id: query_id.into(),
            flex_version: flex_version.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_attempts: 5,
            retry_delay_ms: 5_000,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `FLEX_TOKEN`, `FLEX_QUERY_ID`, and
    /// `FLEX_VERSION` environment variables.
    ///
    /// # Errors
    /// Returns [`ConfigError`] naming the first missing variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("FLEX_TOKEN").unwrap_or_default();
        let query_id = std::env::var("FLEX_QUERY_ID").unwrap_or_default();
        let flex_version = std::env::var("FLEX_VERSION").unwrap_or_else(|_| "3".to_string());
        Self::new(token, query_id, flex_version)
    }

    /// Override the service base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the poll retry budget.
    #[must_use]
    pub fn with_retry(mut self, max_attempts: u32, retry_delay_ms: u64) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError { var: "FLEX_TOKEN" });
        }
        if self.query_id.is_empty() {
            return Err(ConfigError {
                var: "FLEX_QUERY_ID",
            });
        }
        if self.flex_version.is_empty() {
            return Err(ConfigError {
                var: "FLEX_VERSION",
            });
        }
        Ok(())
    }
}
