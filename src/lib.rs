//! SKU Scraper: product record extraction for a single retail site
//!
//! This crate discovers product pages from search results and category
//! listings, fetches them (directly or through a headless browser), and
//! runs a cascade of field extractors that tolerate markup drift to build
//! normalized product records.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod product;
pub mod url;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extractor setup error: {0}")]
    Extract(#[from] extract::ExtractError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors from a single page fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate limited (HTTP 429) at {url}")]
    RateLimited { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("Rendering failed for {url}: {source}")]
    Render {
        url: String,
        source: crawler::RenderError,
    },
}

impl FetchError {
    /// Returns true if the failure is worth retrying after a backoff
    ///
    /// 429, 5xx, timeouts and connection-level failures are transient.
    /// Other HTTP statuses, unreadable bodies and rendering failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => (500..600).contains(status),
            Self::Network { source, .. } => source.is_connect() || source.is_request(),
            Self::Body { .. } | Self::Render { .. } => false,
        }
    }

    /// Returns true if the failure means no rendering session can be created at all
    pub fn is_renderer_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Render {
                source: crawler::RenderError::Unavailable(_),
                ..
            }
        )
    }
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{FetchMode, ScrapeReport, Scraper};
pub use normalize::Vocabulary;
pub use product::{ProductRecord, UrlOutcome};
