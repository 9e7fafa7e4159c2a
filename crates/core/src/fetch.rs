//! Content fetching from URLs, files, and stdin.
//!
//! The pipeline only ever talks to the [`Fetcher`] trait so that tests can
//! hand it fixed HTML instead of making network calls. [`HttpFetcher`] is the
//! production implementation backed by a shared `reqwest` client.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::{ReadaloudError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (compatible; Readaloud/0.1; +https://github.com/readaloud/readaloud)".to_string(),
        }
    }
}

/// A validated request to extract an article from a URL.
///
/// The only way to build one is [`ExtractionRequest::new`], so holding a value
/// means the URL is an absolute `http` or `https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    url: Url,
}

impl ExtractionRequest {
    /// Validates `raw` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`ReadaloudError::InvalidUrl`] when the input is empty, does not
    /// parse as an absolute URL, or uses a scheme other than http/https.
    ///
    /// # Example
    ///
    /// ```rust
    /// use readaloud_core::ExtractionRequest;
    ///
    /// assert!(ExtractionRequest::new("https://example.com/post").is_ok());
    /// assert!(ExtractionRequest::new("ftp://example.com/file").is_err());
    /// assert!(ExtractionRequest::new("example.com").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReadaloudError::InvalidUrl("URL is empty".to_string()));
        }

        let url = Url::parse(trimmed).map_err(|e| ReadaloudError::InvalidUrl(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(ReadaloudError::InvalidUrl(format!(
                "unsupported scheme '{}', expected http:// or https://",
                other
            ))),
        }
    }

    /// The validated URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Raw response body plus the URL it came from.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Undecoded response body.
    pub body: Vec<u8>,
    /// URL the document was requested from; relative links resolve against it.
    pub url: Url,
    /// HTTP status code, when the document came over the network.
    pub status: Option<u16>,
    /// `charset` parameter of the `Content-Type` header, if any.
    pub charset: Option<String>,
}

impl RawDocument {
    /// Wraps an in-memory HTML string (files, stdin, fixtures).
    pub fn from_html(html: impl Into<String>, url: Url) -> Self {
        Self { body: html.into().into_bytes(), url, status: None, charset: None }
    }
}

/// Retrieves the raw document for a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a single GET for `url`.
    async fn fetch(&self, url: &Url) -> Result<RawDocument>;
}

/// [`Fetcher`] backed by `reqwest`.
///
/// The client is built once and reused; it follows redirects using
/// reqwest's default policy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Builds the underlying HTTP client from `config`.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(ReadaloudError::HttpError)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawDocument> {
        tracing::debug!(%url, "fetching document");

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "non-success status, reading body anyway");
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        let final_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        tracing::debug!(url = %final_url, bytes = body.len(), "document fetched");

        Ok(RawDocument { body: body.to_vec(), url: final_url, status: Some(status.as_u16()), charset })
    }
}

fn map_transport_error(err: reqwest::Error, timeout: u64) -> ReadaloudError {
    if err.is_timeout() { ReadaloudError::Timeout { timeout } } else { ReadaloudError::HttpError(err) }
}

/// Pulls the `charset` parameter out of a `Content-Type` header value.
fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(val.trim().trim_matches('"').to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Fetches a URL with a one-off [`HttpFetcher`].
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<RawDocument> {
    let request = ExtractionRequest::new(url)?;
    HttpFetcher::new(config.clone())?.fetch(request.url()).await
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(ReadaloudError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(ReadaloudError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(ReadaloudError::from)?;

    Ok(buffer)
}
