//! Browser rendering for pages that build their content client-side
//!
//! The fetcher depends only on the [`Renderer`] trait. With the `browser`
//! feature enabled, [`ChromeRenderer`] drives a headless Chrome session;
//! otherwise [`UnavailableRenderer`] reports rendering as unavailable.

use crate::config::RenderConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a rendering session
#[derive(Debug, Error)]
pub enum RenderError {
    /// No rendering session can be created at all
    #[error("Browser rendering unavailable: {0}")]
    Unavailable(String),

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Failed to capture rendered page: {0}")]
    Capture(String),
}

/// Produces fully rendered markup for a URL
///
/// `wait_for` is an optional CSS selector to wait for before capturing.
/// Each call owns its session from start to teardown.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String, RenderError>;
}

/// Renderer used when browser support is not compiled in
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

#[async_trait]
impl Renderer for UnavailableRenderer {
    async fn render(&self, _url: &str, _wait_for: Option<&str>) -> Result<String, RenderError> {
        Err(RenderError::Unavailable(
            "built without the `browser` feature".to_string(),
        ))
    }
}

/// Returns the best renderer this build supports
pub fn default_renderer(config: &RenderConfig, user_agent: &str) -> Arc<dyn Renderer> {
    #[cfg(feature = "browser")]
    {
        Arc::new(ChromeRenderer::new(config.clone(), user_agent))
    }

    #[cfg(not(feature = "browser"))]
    {
        let _ = (config, user_agent);
        Arc::new(UnavailableRenderer)
    }
}

#[cfg(feature = "browser")]
pub use chrome::ChromeRenderer;

#[cfg(feature = "browser")]
mod chrome {
    use super::{RenderError, Renderer};
    use crate::config::RenderConfig;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures_util::stream::StreamExt;
    use std::time::Duration;

    const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
    const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0);";

    /// Headless Chrome renderer
    ///
    /// Launches a fresh browser per call with automation fingerprints
    /// suppressed, and always closes it before returning.
    #[derive(Debug, Clone)]
    pub struct ChromeRenderer {
        config: RenderConfig,
        user_agent: String,
    }

    impl ChromeRenderer {
        pub fn new(config: RenderConfig, user_agent: impl Into<String>) -> Self {
            Self {
                config,
                user_agent: user_agent.into(),
            }
        }

        fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .window_size(self.config.window_width, self.config.window_height)
                .request_timeout(Duration::from_secs(self.config.page_load_timeout_secs))
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-gpu")
                .arg(format!("--user-agent={}", self.user_agent));

            if !self.config.headless {
                builder = builder.with_head();
            }

            // Fails when no Chrome executable can be located
            builder.build().map_err(RenderError::Unavailable)
        }

        /// Upper bound for one whole session, from navigation to capture
        ///
        /// Covers the page load, the element wait and every fixed pause, so
        /// a hung tab cannot stall a batch.
        pub(super) fn session_timeout(&self) -> Duration {
            let pauses_ms = self.config.settle_delay_ms
                + self.config.scroll_pause_ms
                + self.config.scroll_top_pause_ms;
            let waits_secs = self.config.page_load_timeout_secs + self.config.element_wait_secs;
            Duration::from_secs(waits_secs) + Duration::from_millis(pauses_ms)
        }

        async fn drive(
            &self,
            browser: &Browser,
            url: &str,
            wait_for: Option<&str>,
        ) -> Result<String, RenderError> {
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            page.enable_stealth_mode_with_agent(&self.user_agent)
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            let load_timeout = Duration::from_secs(self.config.page_load_timeout_secs);
            match tokio::time::timeout(load_timeout, page.goto(url)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
                Err(_) => {
                    return Err(RenderError::Navigation(format!(
                        "page load exceeded {}s",
                        self.config.page_load_timeout_secs
                    )))
                }
            }

            match wait_for {
                Some(selector) => self.wait_for_element(&page, selector).await,
                None => sleep_ms(self.config.settle_delay_ms).await,
            }

            // Trigger lazy-loaded content
            self.scroll(&page, SCROLL_TO_BOTTOM).await;
            sleep_ms(self.config.scroll_pause_ms).await;
            self.scroll(&page, SCROLL_TO_TOP).await;
            sleep_ms(self.config.scroll_top_pause_ms).await;

            page.content()
                .await
                .map_err(|e| RenderError::Capture(e.to_string()))
        }

        /// Polls for `selector`; running out of time is not an error
        async fn wait_for_element(&self, page: &Page, selector: &str) {
            let limit = Duration::from_secs(self.config.element_wait_secs);
            let poll = async {
                loop {
                    if page.find_element(selector).await.is_ok() {
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            };

            if tokio::time::timeout(limit, poll).await.is_err() {
                tracing::debug!(
                    "Timed out waiting for '{}' after {:?}, capturing anyway",
                    selector,
                    limit
                );
            }
        }

        async fn scroll(&self, page: &Page, script: &str) {
            if let Err(e) = page.evaluate(script).await {
                tracing::debug!("Scroll script failed: {}", e);
            }
        }
    }

    #[async_trait]
    impl Renderer for ChromeRenderer {
        async fn render(&self, url: &str, wait_for: Option<&str>) -> Result<String, RenderError> {
            let config = self.browser_config()?;

            let (mut browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| RenderError::Launch(e.to_string()))?;

            let events = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            tracing::debug!("Rendering {} in browser", url);
            let limit = self.session_timeout();
            let session = self.drive(&browser, url, wait_for);
            let result = match tokio::time::timeout(limit, session).await {
                Ok(result) => result,
                Err(_) => Err(RenderError::Capture(format!(
                    "rendering exceeded {:?}",
                    limit
                ))),
            };

            // Teardown runs whatever the outcome
            if let Err(e) = browser.close().await {
                tracing::debug!("Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Browser wait failed: {}", e);
            }
            events.abort();

            result
        }
    }

    async fn sleep_ms(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
