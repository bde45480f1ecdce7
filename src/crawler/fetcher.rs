//! Page fetcher implementation
//!
//! This module retrieves pages in one of two modes:
//! - Direct: an HTTP GET with a realistic browser header set, retried with
//!   exponential backoff on transient failures
//! - Rendered: a browser session that executes scripts before capture
//!
//! Every request, in either mode, is preceded by a randomized pause.

use super::render::Renderer;
use super::retry::{retry_with_backoff, RetryPolicy};
use super::throttle::Throttle;
use crate::config::{Config, HttpConfig};
use crate::{ConfigError, FetchError, ScraperError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a page is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Plain HTTP request
    Direct,
    /// Script-executing browser session
    Rendered,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Rendered => "rendered",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw markup of a fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Page markup
    pub html: String,
    /// Mode that produced the markup
    pub mode: FetchMode,
}

/// Builds the HTTP client used for direct fetches
///
/// Every configured header is sent with each request.
///
/// # Arguments
///
/// * `config` - Header set and request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScraperError)` - A header is invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use sku_scraper::config::HttpConfig;
/// use sku_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ScraperError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::Validation(format!("Invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::Validation(format!("Invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Fetches pages directly or through a renderer
pub struct PageFetcher {
    client: Client,
    renderer: Arc<dyn Renderer>,
    throttle: Throttle,
    retry: RetryPolicy,
    rate_limit_cooldown: Duration,
}

impl PageFetcher {
    /// Creates a fetcher from configuration
    pub fn new(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_http_client(&config.http)?,
            renderer,
            throttle: Throttle::from_config(&config.rate_limit),
            retry: RetryPolicy::from_config(&config.http),
            rate_limit_cooldown: Duration::from_millis(config.http.rate_limit_cooldown_ms),
        })
    }

    /// The pause applied before each request
    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Fetches a page in the given mode
    ///
    /// Direct fetches are retried on transient failures; rendered fetches are
    /// attempted once. `wait_for` is only used by rendered fetches.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `mode` - Direct or rendered
    /// * `wait_for` - Selector to wait for before capturing a rendered page
    pub async fn fetch(
        &self,
        url: &str,
        mode: FetchMode,
        wait_for: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        let html = match mode {
            FetchMode::Direct => {
                retry_with_backoff(&self.retry, || self.fetch_direct_once(url)).await?
            }
            FetchMode::Rendered => self.fetch_rendered(url, wait_for).await?,
        };

        tracing::debug!("Fetched {} ({}, {} bytes)", url, mode, html.len());
        Ok(FetchedPage {
            url: url.to_string(),
            html,
            mode,
        })
    }

    /// One direct attempt
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | body |
    /// | 429 | cooldown sleep, then `RateLimited` (transient) |
    /// | 5xx | `Status` (transient) |
    /// | other status | `Status` (permanent) |
    /// | timeout | `Timeout` (transient) |
    /// | connection failure | `Network` |
    async fn fetch_direct_once(&self, url: &str) -> Result<String, FetchError> {
        self.throttle.pause().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_send_error(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(
                "Rate limited at {}, cooling down for {:?}",
                url,
                self.rate_limit_cooldown
            );
            tokio::time::sleep(self.rate_limit_cooldown).await;
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
    }

    async fn fetch_rendered(
        &self,
        url: &str,
        wait_for: Option<&str>,
    ) -> Result<String, FetchError> {
        self.throttle.pause().await;

        self.renderer
            .render(url, wait_for)
            .await
            .map_err(|source| FetchError::Render {
                url: url.to_string(),
                source,
            })
    }
}

fn classify_send_error(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: err,
        }
    }
}
