use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::rates::{FetchError, RateSource, RawRates};

/// Rate source backed by an ExchangeRate-API style endpoint
/// (`GET <url>` returning `{"result": "success", "rates": {...}}`).
pub struct ExchangeApiSource {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ExchangeApiSource {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("kursbot/0.1")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeApiSource {
            url: url.to_string(),
            timeout,
            client,
        })
    }
}

#[async_trait]
impl RateSource for ExchangeApiSource {
    #[instrument(name = "ExchangeRatesFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<RawRates, FetchError> {
        debug!("Requesting exchange rates");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let data: RawRates = serde_json::from_str(&text)
            .map_err(|e| FetchError::Malformed(format!("Failed to parse JSON response: {e}")))?;
        debug!(result = %data.result, "Received rates response");
        Ok(data)
    }
}
