//! Flex Web Service client.
//!
//! Fetching a statement is a two-step protocol: `SendRequest` asks the
//! service to generate the saved query and returns a reference code, then
//! `GetStatement` is polled with that code until the statement is ready.
//! Generation usually takes a few seconds, so the poll loop retries on a
//! fixed delay with a fixed attempt cap.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use flex_pnl_core::record::TradeRecord;
use flex_pnl_core::FlexConfig;

use crate::error::{FlexError, Result};
use crate::statement;

/// HTTP client for the Flex Web Service.
pub struct FlexClient {
    config: FlexConfig,
    http: Client,
}

impl std::fmt::Debug for FlexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlexClient")
            .field("base_url", &self.config.base_url)
            .field("query_id", &self.config.query_id)
            .finish_non_exhaustive()
    }
}

impl FlexClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: FlexConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("flex-pnl")
            .build()
            .map_err(|e| FlexError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Ask the service to generate the saved query. Returns the reference
    /// code to poll `GetStatement` with.
    pub async fn request_statement(&self) -> Result<String> {
        let url = format!("{}/SendRequest", self.config.base_url);
        info!(query_id = %self.config.query_id, "Requesting statement generation");

        let body = self
            .http
            .get(&url)
            .query(&[
                ("t", self.config.token.as_str()),
                ("q", self.config.query_id.as_str()),
                ("v", self.config.flex_version.as_str()),
            ])
            .send()
            .await?
            .text()
            .await?;

        let reference_code = statement::parse_send_response(&body)?;
        info!(reference_code = %reference_code, "Statement generation accepted");
        Ok(reference_code)
    }

    /// Poll for the generated statement, retrying while the service reports
    /// generation in progress.
    pub async fn poll_statement(&self, reference_code: &str) -> Result<Vec<TradeRecord>> {
        let url = format!("{}/GetStatement", self.config.base_url);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let body = self
                .http
                .get(&url)
                .query(&[
                    ("t", self.config.token.as_str()),
                    ("q", reference_code),
                    ("v", self.config.flex_version.as_str()),
                ])
                .send()
                .await?
                .text()
                .await?;

            match statement::parse_statement(&body) {
                Ok(trades) => {
                    info!(rows = trades.len(), "Statement received");
                    return Ok(trades);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = self.config.retry_delay_ms,
                        "Statement not ready, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Full fetch: request generation, then poll until the statement lands.
    pub async fn fetch_trades(&self) -> Result<Vec<TradeRecord>> {
        let reference_code = self.request_statement().await?;
        self.poll_statement(&reference_code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEND_OK: &str =
        "<FlexStatementResponse><Status>Success</Status><ReferenceCode>42</ReferenceCode></FlexStatementResponse>";

    const PENDING: &str = "<FlexStatementResponse><ErrorCode>1019</ErrorCode>\
        <ErrorMessage>Statement generation in progress.</ErrorMessage></FlexStatementResponse>";

    const REJECTED: &str = "<FlexStatementResponse><ErrorCode>1012</ErrorCode>\
        <ErrorMessage>Token has expired.</ErrorMessage></FlexStatementResponse>";

    const STATEMENT: &str = r#"<FlexQueryResponse><FlexStatements count="1"><FlexStatement><Trades>
        <Trade description="AAPL" assetCategory="STK" underlyingSymbol="AAPL" buySell="SELL"
               tradeDate="20240105" dateTime="20240105;155900" settleDateTarget="20240109"
               openCloseIndicator="C" ibCommission="-0.35" cost="-18525"
               fifoPnlRealized="120" mtmPnl="0"/>
    </Trades></FlexStatement></FlexStatements></FlexQueryResponse>"#;

    fn test_config(server: &MockServer) -> FlexConfig {
        FlexConfig::new("test-token", "987654", "3")
            .expect("valid test config")
            .with_base_url(server.uri())
            .with_retry(3, 10)
    }

    #[tokio::test]
    async fn fetches_trades_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/SendRequest"))
            .and(query_param("q", "987654"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEND_OK))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/GetStatement"))
            .and(query_param("q", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STATEMENT))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlexClient::new(test_config(&server)).unwrap();
        let trades = client.fetch_trades().await.unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].description, "AAPL");
    }

    #[tokio::test]
    async fn retries_while_generation_is_pending() {
        let server = MockServer::start().await;

        // First two polls answer 1019, the third delivers the statement.
        Mock::given(method("GET"))
            .and(path("/GetStatement"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PENDING))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/GetStatement"))
            .respond_with(ResponseTemplate::new(200).set_body_string(STATEMENT))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlexClient::new(test_config(&server)).unwrap();
        let trades = client.poll_statement("42").await.unwrap();
        assert_eq!(trades.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retry_budget_surfaces_the_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/GetStatement"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PENDING))
            .expect(3)
            .mount(&server)
            .await;

        let client = FlexClient::new(test_config(&server)).unwrap();
        let err = client.poll_statement("42").await.unwrap_err();

        assert!(matches!(err, FlexError::GenerationPending { .. }));
        assert!(err.to_string().contains("generation in progress"));
    }

    #[tokio::test]
    async fn rejection_fails_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/GetStatement"))
            .respond_with(ResponseTemplate::new(200).set_body_string(REJECTED))
            .expect(1)
            .mount(&server)
            .await;

        let client = FlexClient::new(test_config(&server)).unwrap();
        let err = client.poll_statement("42").await.unwrap_err();

        assert!(matches!(err, FlexError::Rejected { .. }));
    }
}
