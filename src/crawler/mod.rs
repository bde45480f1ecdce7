//! Crawler module for page fetching and batch scraping
//!
//! This module contains the scraping pipeline, including:
//! - Direct HTTP fetching with retry, backoff and randomized pacing
//! - Browser rendering behind the [`Renderer`] trait
//! - Product link discovery on listing pages
//! - The [`Scraper`] facade that runs batches

mod coordinator;
mod fetcher;
mod links;
mod render;
mod retry;
mod throttle;

pub use coordinator::{BatchStatus, ScrapeReport, Scraper};
pub use fetcher::{build_http_client, FetchMode, FetchedPage, PageFetcher};
pub use links::LinkDiscovery;
#[cfg(feature = "browser")]
pub use render::ChromeRenderer;
pub use render::{default_renderer, RenderError, Renderer, UnavailableRenderer};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use throttle::Throttle;
