//! Product link discovery
//!
//! Scans a listing page (search results or a category) for product URLs.
//!
//! **Include:**
//! - `<a href>` whose path is `/s/{slug}/{digits}`
//! - `<a href>` whose path contains `/browse/` and ends in `/{digits}`
//!
//! **Exclude:**
//! - Non-product sections from the configured exclusion list
//! - Links to other hosts
//! - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only links
//!
//! Results keep first-seen order, contain no duplicates and never exceed
//! the requested maximum.

use crate::config::SiteConfig;
use crate::url::{is_excluded, is_product_path, is_same_site, resolve_link, strip_query};
use crate::{ScraperError, UrlError};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

static PRODUCT_ID_MARKERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-product-id]").expect("valid selector"));

/// Ordered, deduplicated URL list bounded by a maximum
#[derive(Debug)]
struct DiscoveredUrls {
    urls: Vec<Url>,
    seen: HashSet<String>,
    max: usize,
}

impl DiscoveredUrls {
    fn new(max: usize) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            max,
        }
    }

    /// Inserts a URL unless it is already present; returns true once full
    fn push(&mut self, url: Url) -> bool {
        if !self.is_full() && self.seen.insert(url.as_str().to_string()) {
            self.urls.push(url);
        }
        self.is_full()
    }

    fn is_full(&self) -> bool {
        self.urls.len() >= self.max
    }
}

/// Finds product URLs on listing pages for one site
#[derive(Debug, Clone)]
pub struct LinkDiscovery {
    base_url: Url,
    excluded_paths: Vec<String>,
    fallback_product_path: String,
}

impl LinkDiscovery {
    pub fn new(site: &SiteConfig) -> Result<Self, ScraperError> {
        let base_url =
            Url::parse(&site.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        if base_url.host_str().is_none() {
            return Err(UrlError::MissingDomain.into());
        }

        Ok(Self {
            base_url,
            excluded_paths: site.excluded_paths.clone(),
            fallback_product_path: site.fallback_product_path.clone(),
        })
    }

    /// Extracts up to `max` product URLs from a listing page
    ///
    /// Relative links are resolved against `page_url`. When no product link
    /// matches either path shape, URLs are synthesized from elements carrying
    /// a `data-product-id` attribute using the fallback product path.
    ///
    /// # Arguments
    ///
    /// * `page_url` - URL the listing was fetched from
    /// * `html` - The listing markup
    /// * `max` - Maximum number of URLs to return
    pub fn discover(&self, page_url: &str, html: &str, max: usize) -> Vec<Url> {
        if max == 0 {
            return Vec::new();
        }

        let page_base = Url::parse(page_url).unwrap_or_else(|_| self.base_url.clone());
        let document = Html::parse_document(html);
        let mut found = DiscoveredUrls::new(max);

        for anchor in document.select(&ANCHORS) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = self.product_link(href, &page_base) else {
                continue;
            };
            if found.push(url) {
                break;
            }
        }

        if found.urls.is_empty() {
            self.synthesize_from_markers(&document, &mut found);
        }

        tracing::debug!("Discovered {} product URLs on {}", found.urls.len(), page_url);
        found.urls
    }

    /// Resolves and filters one href, returning the query-free product URL
    fn product_link(&self, href: &str, page_base: &Url) -> Option<Url> {
        let absolute = resolve_link(href, page_base)?;

        if !is_product_path(absolute.path()) {
            return None;
        }

        if is_excluded(absolute.as_str(), &self.excluded_paths) {
            tracing::trace!("Excluded non-product link {}", absolute);
            return None;
        }

        if !is_same_site(&absolute, &self.base_url) {
            tracing::trace!("Skipping off-site link {}", absolute);
            return None;
        }

        Some(strip_query(&absolute))
    }

    fn synthesize_from_markers(&self, document: &Html, found: &mut DiscoveredUrls) {
        for element in document.select(&PRODUCT_ID_MARKERS) {
            let Some(id) = element
                .value()
                .attr("data-product-id")
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                continue;
            };

            let path = self.fallback_product_path.replace("{id}", id);
            let Ok(url) = self.base_url.join(&path) else {
                continue;
            };
            if found.push(url) {
                break;
            }
        }

        if !found.urls.is_empty() {
            tracing::info!(
                "No product links matched, built {} URLs from product id markers",
                found.urls.len()
            );
        }
    }
}
