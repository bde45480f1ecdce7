//! Scraper facade - batch orchestration
//!
//! This module ties link discovery, page fetching and field extraction
//! together behind three entry points:
//! - Searching for products by keyword (URLs only)
//! - Scraping every product on a category page
//! - Scraping an explicit list of product URLs
//!
//! Batches are strictly sequential. Cancellation is observed between items
//! and during inter-item pauses, never in the middle of a page.

use super::fetcher::{FetchMode, FetchedPage, PageFetcher};
use super::links::LinkDiscovery;
use super::render::{default_renderer, Renderer};
use crate::config::{validate, Config};
use crate::extract::FieldExtractors;
use crate::normalize::Vocabulary;
use crate::output::ScrapeStatistics;
use crate::product::{validate_record, ProductRecord, UrlOutcome};
use crate::{ScraperError, UrlError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a batch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every item was processed
    Completed,
    /// Stopped early by a cancellation request
    Interrupted,
    /// Stopped by a failure that makes further items pointless
    Aborted { reason: String },
}

/// Products and counters from one batch
///
/// Products gathered before an interruption or abort are kept.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    /// Valid records, in input order
    pub products: Vec<ProductRecord>,
    pub status: BatchStatus,
    pub stats: ScrapeStatistics,
}

impl ScrapeReport {
    fn new() -> Self {
        Self {
            products: Vec::new(),
            status: BatchStatus::Completed,
            stats: ScrapeStatistics::default(),
        }
    }

    fn aborted(reason: impl Into<String>) -> Self {
        Self {
            status: BatchStatus::Aborted {
                reason: reason.into(),
            },
            ..Self::new()
        }
    }

    /// Returns true if at least one product was extracted
    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }
}

/// Product scraper for one site
pub struct Scraper {
    config: Arc<Config>,
    mode: FetchMode,
    fetcher: PageFetcher,
    extractors: FieldExtractors,
    links: LinkDiscovery,
    cancel: CancellationToken,
}

impl Scraper {
    /// Creates a scraper using the best renderer this build supports
    ///
    /// # Arguments
    ///
    /// * `config` - Validated against the configuration rules first
    /// * `mode` - Preferred fetch mode for every page
    pub fn new(config: Config, mode: FetchMode) -> Result<Self, ScraperError> {
        let renderer = default_renderer(&config.browser, config.http.user_agent());
        Self::with_renderer(config, mode, renderer)
    }

    /// Creates a scraper with an explicit rendering backend
    pub fn with_renderer(
        config: Config,
        mode: FetchMode,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, ScraperError> {
        validate(&config)?;

        let vocabulary = Arc::new(Vocabulary::from_config(&config.vocabulary));
        let extractors = FieldExtractors::new(
            vocabulary,
            config.site.sku_prefix.as_str(),
            config.site.name.as_str(),
        )?;

        Ok(Self {
            fetcher: PageFetcher::new(&config, renderer)?,
            links: LinkDiscovery::new(&config.site)?,
            extractors,
            mode,
            config: Arc::new(config),
            cancel: CancellationToken::new(),
        })
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops running batches between items
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Searches by keyword and returns up to `max_results` product URLs
    ///
    /// The URLs are not extracted; pass them to
    /// [`scrape_product_urls`](Self::scrape_product_urls). A failed search
    /// page fetch yields an empty list.
    ///
    /// # Errors
    ///
    /// Fails only when browser mode is preferred and no rendering session
    /// can be created.
    pub async fn search_products(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Url>, ScraperError> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let search_url = self.config.site.search_url.replace("{query}", &encoded);
        tracing::info!("Searching for: {}", query);

        let Some(page) = self.fetch_listing(&search_url).await? else {
            return Ok(Vec::new());
        };

        let urls = self.links.discover(&page.url, &page.html, max_results);
        tracing::info!("Found {} product URLs for '{}'", urls.len(), query);
        Ok(urls)
    }

    /// Scrapes up to `max_products` products linked from a category page
    ///
    /// # Errors
    ///
    /// Fails only if `category_url` is not an absolute HTTP(S) URL.
    pub async fn scrape_category(
        &self,
        category_url: &str,
        max_products: usize,
    ) -> Result<ScrapeReport, ScraperError> {
        let url = Url::parse(category_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()).into());
        }

        tracing::info!("Scraping category: {}", category_url);
        let page = match self.fetch_listing(url.as_str()).await {
            Ok(Some(page)) => page,
            Ok(None) => return Ok(ScrapeReport::new()),
            Err(e) => return Ok(ScrapeReport::aborted(e.to_string())),
        };

        let urls = self.links.discover(&page.url, &page.html, max_products);
        tracing::info!("Found {} product URLs in category", urls.len());

        Ok(self.scrape_product_urls(&urls).await)
    }

    /// Scrapes each URL in order, pausing between items
    pub async fn scrape_product_urls<U: AsRef<str>>(&self, urls: &[U]) -> ScrapeReport {
        let mut report = ScrapeReport::new();
        let total = urls.len();

        for (index, url) in urls.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!("Scrape interrupted after {} of {} URLs", index, total);
                report.status = BatchStatus::Interrupted;
                break;
            }

            let url = url.as_ref();
            tracing::info!("Scraping product {}/{}", index + 1, total);

            match self.scrape_url(url, &mut report.stats).await {
                Ok(outcome) => {
                    report.stats.record(&outcome);
                    if let Some(record) = outcome.into_record() {
                        report.products.push(record);
                    }
                }
                Err(e) => {
                    report.stats.urls_attempted += 1;
                    tracing::error!("Aborting batch at {}: {}", url, e);
                    report.status = BatchStatus::Aborted {
                        reason: e.to_string(),
                    };
                    break;
                }
            }

            if index + 1 < total {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        tracing::info!("Scrape interrupted after {} of {} URLs", index + 1, total);
                        report.status = BatchStatus::Interrupted;
                        break;
                    }
                    _ = self.fetcher.throttle().pause() => {}
                }
            }
        }

        tracing::info!(
            "Batch finished: {} of {} URLs extracted",
            report.products.len(),
            total
        );
        report
    }

    /// Extracts one product page into a validated record
    ///
    /// Returns `Ok(None)` when the page cannot be fetched or the record is
    /// missing a required field.
    pub async fn extract_product(&self, url: &str) -> Result<Option<ProductRecord>, ScraperError> {
        let mut stats = ScrapeStatistics::default();
        Ok(self.scrape_url(url, &mut stats).await?.into_record())
    }

    async fn scrape_url(
        &self,
        url: &str,
        stats: &mut ScrapeStatistics,
    ) -> Result<UrlOutcome, ScraperError> {
        tracing::info!("Extracting product from: {}", url);

        let Some(page) = self.fetch_product(url, stats).await? else {
            return Ok(UrlOutcome::FetchFailed);
        };

        let record = self.extractors.extract_record(url, &page.html);
        match validate_record(&record) {
            Ok(()) => Ok(UrlOutcome::Extracted(record)),
            Err(field) => {
                tracing::warn!("Product validation failed for {}: missing {}", url, field);
                Ok(UrlOutcome::Invalid(field))
            }
        }
    }

    /// Fetches a product page, falling back to browser mode once
    ///
    /// The fallback only runs when direct mode was preferred; a failed
    /// browser-mode fetch never falls back to direct mode.
    async fn fetch_product(
        &self,
        url: &str,
        stats: &mut ScrapeStatistics,
    ) -> Result<Option<FetchedPage>, ScraperError> {
        let err = match self.fetcher.fetch(url, self.mode, None).await {
            Ok(page) => return Ok(Some(page)),
            Err(err) => err,
        };

        if self.mode == FetchMode::Rendered {
            if err.is_renderer_unavailable() {
                return Err(err.into());
            }
            tracing::warn!("Failed to fetch {}: {}", url, err);
            return Ok(None);
        }

        tracing::warn!("Direct fetch failed for {}: {}", url, err);
        tracing::info!("Attempting browser rendering for {}", url);
        stats.browser_fallbacks += 1;

        let wait_for = self.config.browser.fallback_wait_selector.as_str();
        match self
            .fetcher
            .fetch(url, FetchMode::Rendered, Some(wait_for))
            .await
        {
            Ok(page) => Ok(Some(page)),
            Err(err) if err.is_renderer_unavailable() => {
                tracing::warn!("Browser rendering not available, cannot use as fallback");
                Ok(None)
            }
            Err(err) => {
                tracing::warn!("Browser fallback failed for {}: {}", url, err);
                Ok(None)
            }
        }
    }

    /// Fetches a search or category page in the preferred mode
    async fn fetch_listing(&self, url: &str) -> Result<Option<FetchedPage>, ScraperError> {
        match self.fetcher.fetch(url, self.mode, None).await {
            Ok(page) => Ok(Some(page)),
            Err(err) if self.mode == FetchMode::Rendered && err.is_renderer_unavailable() => {
                Err(err.into())
            }
            Err(err) => {
                tracing::warn!("Failed to fetch listing {}: {}", url, err);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::render::UnavailableRenderer;

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.rate_limit.min_delay_ms = 0;
        config.rate_limit.max_delay_ms = 0;
        config
    }

    fn scraper(mode: FetchMode) -> Scraper {
        Scraper::with_renderer(quiet_config(), mode, Arc::new(UnavailableRenderer)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quiet_config();
        config.http.max_attempts = 0;
        assert!(matches!(
            Scraper::with_renderer(config, FetchMode::Direct, Arc::new(UnavailableRenderer)),
            Err(ScraperError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_category_url_must_be_absolute() {
        let scraper = scraper(FetchMode::Direct);
        assert!(matches!(
            scraper.scrape_category("/browse/women", 10).await,
            Err(ScraperError::UrlError(UrlError::Parse(_)))
        ));
        assert!(matches!(
            scraper.scrape_category("ftp://nordstrom.com/x", 10).await,
            Err(ScraperError::UrlError(UrlError::InvalidScheme(_)))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        let scraper = scraper(FetchMode::Direct).with_cancellation(token.clone());
        token.cancel();

        let report = scraper
            .scrape_product_urls(&["https://www.nordstrom.com/s/dress/1234567"])
            .await;
        assert_eq!(report.status, BatchStatus::Interrupted);
        assert_eq!(report.stats.urls_attempted, 0);
        assert!(!report.has_products());
    }

    #[tokio::test]
    async fn test_empty_batch_completes() {
        let report = scraper(FetchMode::Direct)
            .scrape_product_urls::<String>(&[])
            .await;
        assert_eq!(report.status, BatchStatus::Completed);
        assert!(report.products.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_renderer_aborts_browser_batch() {
        let report = scraper(FetchMode::Rendered)
            .scrape_product_urls(&[
                "https://www.nordstrom.com/s/dress/1234567",
                "https://www.nordstrom.com/s/skirt/7654321",
            ])
            .await;
        assert!(matches!(report.status, BatchStatus::Aborted { .. }));
        assert_eq!(report.stats.urls_attempted, 1);
    }
}
