use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for the scraper
///
/// Every section is optional; missing sections fall back to the defaults
/// for the built-in site profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub browser: RenderConfig,
    pub vocabulary: VocabularyConfig,
    pub output: OutputConfig,
}

/// Target site description
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Brand name used when a product page names no brand
    pub name: String,

    /// Site root; relative links are resolved against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Search endpoint with a `{query}` placeholder
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Tag prepended to identifiers derived from URLs or id attributes
    #[serde(rename = "sku-prefix")]
    pub sku_prefix: String,

    /// Product path template with an `{id}` placeholder, used when a listing
    /// exposes product ids but no product links
    #[serde(rename = "fallback-product-path")]
    pub fallback_product_path: String,

    /// Path fragments that mark non-product pages
    #[serde(rename = "excluded-paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Nordstrom".to_string(),
            base_url: "https://www.nordstrom.com".to_string(),
            search_url: "https://www.nordstrom.com/browse/search?keyword={query}".to_string(),
            sku_prefix: "NORD".to_string(),
            fallback_product_path: "/browse/women/clothing/item/{id}".to_string(),
            excluded_paths: strings(&[
                "/customer-service/",
                "/policy/",
                "/help/",
                "/about/",
                "/store-locator",
                "/nordy-club/",
                "/sale?",
                "/promotions",
            ]),
        }
    }
}

/// Direct HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per URL, first try included
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base delay of the exponential backoff between attempts
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay
    #[serde(rename = "backoff-max-ms")]
    pub backoff_max_ms: u64,

    /// Cooldown slept after an HTTP 429 before the attempt is retried
    #[serde(rename = "rate-limit-cooldown-ms")]
    pub rate_limit_cooldown_ms: u64,

    /// Header set sent with every direct request
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let headers = [
            ("User-Agent", DEFAULT_USER_AGENT),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Upgrade-Insecure-Requests", "1"),
            ("Sec-Fetch-Dest", "document"),
            ("Sec-Fetch-Mode", "navigate"),
            ("Sec-Fetch-Site", "none"),
            ("Cache-Control", "max-age=0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            timeout_secs: 30,
            max_attempts: 3,
            backoff_base_ms: 1000,
            backoff_max_ms: 10_000,
            rate_limit_cooldown_ms: 5000,
            headers,
        }
    }
}

impl HttpConfig {
    /// The configured User-Agent, shared with the browser session
    pub fn user_agent(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
            .map(|(_, value)| value.as_str())
            .unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Randomized pause applied before every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }
}

/// Headless browser session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub headless: bool,

    #[serde(rename = "page-load-timeout-secs")]
    pub page_load_timeout_secs: u64,

    /// How long to wait for the caller's selector hint to appear
    #[serde(rename = "element-wait-secs")]
    pub element_wait_secs: u64,

    /// Fixed wait used when no selector hint is given
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Pause after scrolling to the bottom
    #[serde(rename = "scroll-pause-ms")]
    pub scroll_pause_ms: u64,

    /// Pause after scrolling back to the top
    #[serde(rename = "scroll-top-pause-ms")]
    pub scroll_top_pause_ms: u64,

    /// Selector awaited when a failed direct fetch falls back to the browser
    #[serde(rename = "fallback-wait-selector")]
    pub fallback_wait_selector: String,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            page_load_timeout_secs: 30,
            element_wait_secs: 10,
            settle_delay_ms: 3000,
            scroll_pause_ms: 2000,
            scroll_top_pause_ms: 1000,
            fallback_wait_selector: "[data-product-id]".to_string(),
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// An ordered `from -> to` rewrite
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Alias {
    pub from: String,
    pub to: String,
}

impl Alias {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Canonical color and garment vocabularies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub colors: Vec<String>,

    pub garments: Vec<String>,

    /// Abbreviations tried when no color term is present
    #[serde(rename = "color-abbreviations")]
    pub color_abbreviations: Vec<Alias>,

    /// Rewrites applied to a matched color term
    #[serde(rename = "color-synonyms")]
    pub color_synonyms: Vec<Alias>,

    /// Rewrites applied to a matched garment term
    #[serde(rename = "type-synonyms")]
    pub type_synonyms: Vec<Alias>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            colors: strings(&[
                "black",
                "white",
                "red",
                "blue",
                "green",
                "yellow",
                "orange",
                "purple",
                "pink",
                "brown",
                "gray",
                "grey",
                "navy",
                "beige",
                "tan",
                "burgundy",
                "maroon",
                "teal",
                "turquoise",
                "coral",
                "salmon",
                "ivory",
                "cream",
                "khaki",
                "olive",
                "gold",
                "silver",
                "bronze",
                "charcoal",
                "slate",
            ]),
            garments: strings(&[
                "dress",
                "shirt",
                "blouse",
                "t-shirt",
                "tshirt",
                "t shirt",
                "top",
                "sweater",
                "jacket",
                "coat",
                "blazer",
                "cardigan",
                "hoodie",
                "sweatshirt",
                "pants",
                "jeans",
                "trousers",
                "leggings",
                "shorts",
                "skirt",
                "suit",
                "vest",
                "jumper",
                "romper",
                "jumpsuit",
            ]),
            color_abbreviations: vec![
                Alias::new("blk", "black"),
                Alias::new("wht", "white"),
                Alias::new("blu", "blue"),
                Alias::new("gry", "gray"),
                Alias::new("grn", "green"),
                Alias::new("nvy", "navy"),
                Alias::new("beg", "beige"),
                Alias::new("brn", "brown"),
                Alias::new("brg", "burgundy"),
            ],
            color_synonyms: vec![Alias::new("grey", "gray")],
            type_synonyms: vec![
                Alias::new("tshirt", "t-shirt"),
                Alias::new("t shirt", "t-shirt"),
                Alias::new("top", "shirt"),
                Alias::new("trousers", "pants"),
            ],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exported files are written to
    pub directory: String,

    /// One of `json`, `csv` or `both`
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "scraped_data".to_string(),
            format: "both".to_string(),
        }
    }
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
