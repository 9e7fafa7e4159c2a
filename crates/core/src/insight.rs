//! Client for the downstream summarization service.
//!
//! The service takes the extracted article text and answers with a short
//! reply meant to be read aloud. Both directions use the same JSON shape:
//! `{ "text": "..." }`.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ReadaloudError, Result};

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct InsightResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Posts article text to the insight endpoint.
#[derive(Debug, Clone)]
pub struct InsightClient {
    client: Client,
    endpoint: Url,
}

impl InsightClient {
    /// Builds a client for `endpoint` with a per-request timeout in seconds.
    ///
    /// # Errors
    ///
    /// [`ReadaloudError::InvalidUrl`] if `endpoint` is not an absolute URL.
    pub fn new(endpoint: &str, timeout: u64) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| ReadaloudError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(ReadaloudError::HttpError)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends `text` and returns the service's reply.
    ///
    /// # Errors
    ///
    /// [`ReadaloudError::Insight`] when the request fails, the service
    /// answers with a non-success status, or the reply carries no text.
    pub async fn request(&self, text: &str) -> Result<String> {
        tracing::debug!(endpoint = %self.endpoint, chars = text.chars().count(), "requesting insight");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&InsightRequest { text })
            .send()
            .await
            .map_err(|e| ReadaloudError::Insight(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadaloudError::Insight(format!("service returned status {}", status.as_u16())));
        }

        let reply: InsightResponse = response
            .json()
            .await
            .map_err(|e| ReadaloudError::Insight(format!("malformed reply: {}", e)))?;

        match reply.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ReadaloudError::Insight("No insight response".to_string())),
        }
    }
}
