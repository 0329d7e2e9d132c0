use super::util::with_retry;
use crate::core::error::RateError;
use crate::core::rates::{RateProvider, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const USER_AGENT: &str = concat!("xcur/", env!("CARGO_PKG_VERSION"));

/// Latest-rates client for the open exchange rate API
/// (`GET {base_url}/v6/latest/{BASE}`).
pub struct OpenErApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl OpenErApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(OpenErApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries: 3,
            retry_delay_ms: 500,
        })
    }

    pub fn with_retry_policy(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    rates: Option<RateTable>,
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    #[instrument(name = "OpenErApiFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError> {
        let url = format!("{}/v6/latest/{}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let response = with_retry(
            || self.client.get(&url).send(),
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| RateError::NetworkFailure(format!("Request error: {e} for base: {base}")))?;

        if !response.status().is_success() {
            return Err(RateError::NetworkFailure(format!(
                "HTTP error: {} for base: {}",
                response.status(),
                base
            )));
        }

        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text).map_err(|e| {
            RateError::MalformedResponse(format!("Failed to parse JSON response for {base}: {e}"))
        })?;

        if let Some(result) = data.result.as_deref() {
            if result != "success" {
                return Err(RateError::MalformedResponse(format!(
                    "API returned {} for base: {} ({})",
                    result,
                    base,
                    data.error_type.as_deref().unwrap_or("unknown")
                )));
            }
        }

        let rates = data
            .rates
            .filter(|rates| !rates.is_empty())
            .ok_or_else(|| {
                RateError::MalformedResponse(format!("No rate data found for base: {base}"))
            })?;

        debug!(count = rates.len(), "Received rates");
        Ok(rates)
    }
}
