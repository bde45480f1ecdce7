//! Integration tests for the scraper
//!
//! These tests use wiremock to serve listing and product pages and run
//! the full fetch, discover, extract and export cycle end-to-end.

use async_trait::async_trait;
use sku_scraper::config::Config;
use sku_scraper::crawler::{
    BatchStatus, FetchMode, RenderError, Renderer, Scraper, UnavailableRenderer,
};
use sku_scraper::output::{export_products, ExportFormat};
use sku_scraper::product::MissingField;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DRESS_PAGE: &str = r#"<html><body>
    <h1>Astr Maeve Black Midi Dress</h1>
    <div class="product-brand">ASTR the Label</div>
    <p>Item # 7737947</p>
</body></html>"#;

const BLOUSE_PAGE: &str = r#"<html><body>
    <h1>Ruffle Wrap Blouse</h1>
    <span class="color-option">Ivory</span>
</body></html>"#;

const GIFT_CARD_PAGE: &str = "<html><body><h1>Gift Card</h1></body></html>";

/// Creates a test configuration pointed at the mock server with no pacing
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.search_url = format!("{}/browse/search?keyword={{query}}", base_url);
    config.http.timeout_secs = 5;
    config.http.max_attempts = 3;
    config.http.backoff_base_ms = 0;
    config.http.backoff_max_ms = 0;
    config.http.rate_limit_cooldown_ms = 0;
    config.rate_limit.min_delay_ms = 0;
    config.rate_limit.max_delay_ms = 0;
    config
}

fn direct_scraper(base_url: &str) -> Scraper {
    Scraper::with_renderer(
        create_test_config(base_url),
        FetchMode::Direct,
        Arc::new(UnavailableRenderer),
    )
    .expect("Failed to create scraper")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Renderer that serves fixed HTML and counts its calls
struct StubRenderer {
    html: String,
    calls: AtomicUsize,
}

impl StubRenderer {
    fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, _url: &str, _wait_for: Option<&str>) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}

/// Renderer that cancels the batch once it has served its first page
struct CancellingRenderer {
    token: CancellationToken,
    calls: AtomicUsize,
}

#[async_trait]
impl Renderer for CancellingRenderer {
    async fn render(&self, _url: &str, _wait_for: Option<&str>) -> Result<String, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        Ok(DRESS_PAGE.to_string())
    }
}

/// Renderer that serves one page and then loses its browser
struct FlakyRenderer {
    calls: AtomicUsize,
}

#[async_trait]
impl Renderer for FlakyRenderer {
    async fn render(&self, _url: &str, _wait_for: Option<&str>) -> Result<String, RenderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(DRESS_PAGE.to_string())
        } else {
            Err(RenderError::Unavailable("chrome exited".to_string()))
        }
    }
}

#[tokio::test]
async fn test_category_scrape_end_to_end() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let category = format!(
        r#"<html><body>
            <a href="/s/astr-maeve-midi-dress/7737947?origin=category">Dress</a>
            <a href="/s/astr-maeve-midi-dress/7737947?origin=coordinating">Dress again</a>
            <a href="{base}/s/ruffle-wrap-blouse/7811111#reviews">Blouse</a>
            <a href="/s/gift-card/7000001">Gift card</a>
            <a href="/customer-service/s/returns/1234567">Returns</a>
            <a href="https://elsewhere.example.com/s/other-dress/9999999">Elsewhere</a>
            <a href="/browse/women/dresses">Dresses</a>
            <a href="javascript:void(0)">Nothing</a>
        </body></html>"#,
        base = base_url
    );

    mount_page(&mock_server, "/browse/women/dresses", &category).await;
    mount_page(&mock_server, "/s/astr-maeve-midi-dress/7737947", DRESS_PAGE).await;
    mount_page(&mock_server, "/s/ruffle-wrap-blouse/7811111", BLOUSE_PAGE).await;
    mount_page(&mock_server, "/s/gift-card/7000001", GIFT_CARD_PAGE).await;

    let scraper = direct_scraper(&base_url);
    let report = scraper
        .scrape_category(&format!("{}/browse/women/dresses", base_url), 100)
        .await
        .expect("Category scrape failed");

    assert_eq!(report.status, BatchStatus::Completed);
    assert_eq!(report.stats.urls_attempted, 3);
    assert_eq!(report.stats.products_extracted, 2);
    assert_eq!(
        report.stats.invalid_by_field.get(&MissingField::GarmentType),
        Some(&1)
    );

    let dress = &report.products[0];
    assert_eq!(
        dress.url,
        format!("{}/s/astr-maeve-midi-dress/7737947", base_url)
    );
    assert_eq!(dress.sku_code.as_deref(), Some("NORD-7737947"));
    assert_eq!(dress.color.as_deref(), Some("black"));
    assert_eq!(dress.garment_type.as_deref(), Some("dress"));
    assert_eq!(dress.brand, "ASTR the Label");
    assert_eq!(dress.item_number.as_deref(), Some("7737947"));
    assert_eq!(
        dress.description.as_deref(),
        Some("Astr Maeve Black Midi Dress")
    );

    let blouse = &report.products[1];
    assert_eq!(blouse.sku_code.as_deref(), Some("NORD-7811111"));
    assert_eq!(blouse.color.as_deref(), Some("ivory"));
    assert_eq!(blouse.garment_type.as_deref(), Some("blouse"));
    assert_eq!(blouse.brand, "Nordstrom");
}

#[tokio::test]
async fn test_category_respects_max_products() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let category = r#"<a href="/s/astr-maeve-midi-dress/7737947">1</a>
        <a href="/s/ruffle-wrap-blouse/7811111">2</a>"#;
    mount_page(&mock_server, "/browse/women", category).await;
    mount_page(&mock_server, "/s/astr-maeve-midi-dress/7737947", DRESS_PAGE).await;

    Mock::given(method("GET"))
        .and(path("/s/ruffle-wrap-blouse/7811111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOUSE_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&base_url);
    let report = scraper
        .scrape_category(&format!("{}/browse/women", base_url), 1)
        .await
        .unwrap();

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.stats.urls_attempted, 1);
}

#[tokio::test]
async fn test_category_fallback_to_product_ids() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let category = r#"<div data-product-id="5551234">Card</div>"#;
    mount_page(&mock_server, "/browse/women", category).await;
    mount_page(
        &mock_server,
        "/browse/women/clothing/item/5551234",
        r#"<h1>Black Midi Dress</h1><div data-product-id="5551234"></div>"#,
    )
    .await;

    let scraper = direct_scraper(&base_url);
    let report = scraper
        .scrape_category(&format!("{}/browse/women", base_url), 10)
        .await
        .unwrap();

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.products[0].sku_code.as_deref(), Some("NORD-5551234"));
}

#[tokio::test]
async fn test_search_returns_product_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/browse/search"))
        .and(query_param("keyword", "midi dress"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="/s/astr-maeve-midi-dress/7737947">1</a>
               <a href="/s/slip-midi-dress/7822222">2</a>
               <a href="/s/satin-midi-dress/7833333">3</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&base_url);
    let urls = scraper.search_products("midi dress", 2).await.unwrap();

    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0].path(), "/s/astr-maeve-midi-dress/7737947");
    assert_eq!(urls[1].path(), "/s/slip-midi-dress/7822222");
}

#[tokio::test]
async fn test_failed_search_page_yields_no_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&mock_server.uri());
    let urls = scraper.search_products("dress", 10).await.unwrap();
    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_rate_limited_requests_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/astr-maeve-midi-dress/7737947"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&mock_server.uri());
    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    assert_eq!(report.status, BatchStatus::Completed);
    assert!(report.products.is_empty());
    assert_eq!(report.stats.fetch_failures, 1);
    assert_eq!(report.stats.browser_fallbacks, 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/astr-maeve-midi-dress/7737947"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&mock_server.uri());
    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let record = scraper.extract_product(&url).await.unwrap();
    assert!(record.is_none());
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/discontinued-dress/7000000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&mock_server.uri());
    let url = format!("{}/s/discontinued-dress/7000000", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    assert_eq!(report.stats.fetch_failures, 1);
    assert!(report.products.is_empty());
}

#[tokio::test]
async fn test_failed_item_does_not_stop_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/discontinued-dress/7000000"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/s/astr-maeve-midi-dress/7737947", DRESS_PAGE).await;

    let scraper = direct_scraper(&mock_server.uri());
    let urls = [
        format!("{}/s/discontinued-dress/7000000", mock_server.uri()),
        format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri()),
    ];
    let report = scraper.scrape_product_urls(&urls).await;

    assert_eq!(report.status, BatchStatus::Completed);
    assert_eq!(report.products.len(), 1);
    assert_eq!(report.stats.urls_attempted, 2);
}

#[tokio::test]
async fn test_sku_selector_precedence() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/s/linen-blazer/7855555",
        r#"<html><body>
            <h1>Linen Blazer</h1>
            <div data-sku="XY998877"></div>
            <span class="product-sku">SKU: AB12345</span>
            <span>Style: ZZ55555</span>
        </body></html>"#,
    )
    .await;

    let scraper = direct_scraper(&mock_server.uri());
    let url = format!("{}/s/linen-blazer/7855555", mock_server.uri());
    let record = scraper.extract_product(&url).await.unwrap().unwrap();

    assert_eq!(record.sku_code.as_deref(), Some("XY998877"));
    assert_eq!(record.garment_type.as_deref(), Some("blazer"));
}

#[tokio::test]
async fn test_browser_fallback_after_direct_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/astr-maeve-midi-dress/7737947"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let renderer = Arc::new(StubRenderer::new(DRESS_PAGE));
    let scraper = Scraper::with_renderer(
        create_test_config(&mock_server.uri()),
        FetchMode::Direct,
        renderer.clone(),
    )
    .unwrap();

    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.stats.browser_fallbacks, 1);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_browser_mode_skips_direct_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DRESS_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let renderer = Arc::new(StubRenderer::new(DRESS_PAGE));
    let scraper = Scraper::with_renderer(
        create_test_config(&mock_server.uri()),
        FetchMode::Rendered,
        renderer.clone(),
    )
    .unwrap();

    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    assert_eq!(report.products.len(), 1);
    assert_eq!(report.stats.browser_fallbacks, 0);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unavailable_renderer_aborts_browser_batch() {
    let scraper = Scraper::with_renderer(
        create_test_config("https://www.nordstrom.com"),
        FetchMode::Rendered,
        Arc::new(UnavailableRenderer),
    )
    .unwrap();

    let report = scraper
        .scrape_product_urls(&[
            "https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947",
            "https://www.nordstrom.com/s/ruffle-wrap-blouse/7811111",
        ])
        .await;

    assert!(matches!(report.status, BatchStatus::Aborted { .. }));
    assert!(report.products.is_empty());
    assert_eq!(report.stats.urls_attempted, 1);
    assert_eq!(report.stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_cancelled_batch_is_interrupted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DRESS_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let scraper = direct_scraper(&mock_server.uri());
    scraper.cancellation_token().cancel();

    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    assert_eq!(report.status, BatchStatus::Interrupted);
    assert!(report.products.is_empty());
}

#[tokio::test]
async fn test_scrape_and_export() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/s/astr-maeve-midi-dress/7737947", DRESS_PAGE).await;

    let scraper = direct_scraper(&mock_server.uri());
    let url = format!("{}/s/astr-maeve-midi-dress/7737947", mock_server.uri());
    let report = scraper.scrape_product_urls(&[url]).await;

    let dir = tempfile::tempdir().unwrap();
    let paths = export_products(&report.products, ExportFormat::Both, dir.path(), "Nordstrom")
        .expect("Export failed");
    assert_eq!(paths.len(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths[0]).unwrap()).unwrap();
    assert_eq!(json[0]["sku_code"], "NORD-7737947");
    assert_eq!(json[0]["type"], "dress");

    let csv = std::fs::read_to_string(&paths[1]).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("sku_code,color,type,brand,description,url")
    );
    assert!(lines.next().unwrap().starts_with("NORD-7737947,black,dress,ASTR the Label,"));
}

#[tokio::test]
async fn test_interrupt_between_items_keeps_products() {
    let token = CancellationToken::new();
    let renderer = Arc::new(CancellingRenderer {
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });

    let scraper = Scraper::with_renderer(
        create_test_config("https://www.nordstrom.com"),
        FetchMode::Rendered,
        renderer.clone(),
    )
    .unwrap()
    .with_cancellation(token);

    let report = scraper
        .scrape_product_urls(&[
            "https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947",
            "https://www.nordstrom.com/s/ruffle-wrap-blouse/7811111",
        ])
        .await;

    assert_eq!(report.status, BatchStatus::Interrupted);
    assert_eq!(report.products.len(), 1);
    assert_eq!(
        report.products[0].sku_code.as_deref(),
        Some("NORD-7737947")
    );
    assert_eq!(report.stats.urls_attempted, 1);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_abort_mid_batch_keeps_products() {
    let renderer = Arc::new(FlakyRenderer {
        calls: AtomicUsize::new(0),
    });
    let scraper = Scraper::with_renderer(
        create_test_config("https://www.nordstrom.com"),
        FetchMode::Rendered,
        renderer.clone(),
    )
    .unwrap();

    let report = scraper
        .scrape_product_urls(&[
            "https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947",
            "https://www.nordstrom.com/s/ruffle-wrap-blouse/7811111",
            "https://www.nordstrom.com/s/linen-blazer/7855555",
        ])
        .await;

    assert!(matches!(report.status, BatchStatus::Aborted { .. }));
    assert_eq!(report.products.len(), 1);
    assert_eq!(
        report.products[0].sku_code.as_deref(),
        Some("NORD-7737947")
    );
    assert_eq!(report.stats.urls_attempted, 2);
    assert_eq!(report.stats.products_extracted, 1);
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
}
