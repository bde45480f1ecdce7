use crate::config::types::{
    Config, HttpConfig, OutputConfig, RateLimitConfig, RenderConfig, SiteConfig, VocabularyConfig,
};
use crate::output::ExportFormat;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_http_config(&config.http)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_render_config(&config.browser)?;
    validate_vocabulary_config(&config.vocabulary)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    validate_http_url("base-url", &config.base_url)?;

    if !config.search_url.contains("{query}") {
        return Err(ConfigError::Validation(format!(
            "search-url must contain a {{query}} placeholder, got '{}'",
            config.search_url
        )));
    }
    validate_http_url("search-url", &config.search_url.replace("{query}", "q"))?;

    if config.sku_prefix.is_empty()
        || !config
            .sku_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "sku-prefix must be non-empty and alphanumeric, got '{}'",
            config.sku_prefix
        )));
    }

    if !config.fallback_product_path.starts_with('/')
        || !config.fallback_product_path.contains("{id}")
    {
        return Err(ConfigError::Validation(format!(
            "fallback-product-path must be an absolute path containing {{id}}, got '{}'",
            config.fallback_product_path
        )));
    }

    if config.excluded_paths.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "excluded-paths cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates direct fetch settings and the header set
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.backoff_base_ms > config.backoff_max_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-base-ms ({}) cannot exceed backoff-max-ms ({})",
            config.backoff_base_ms, config.backoff_max_ms
        )));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::Validation(format!("Invalid header name '{}'", name)))?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates the randomized pause bounds
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}) cannot exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }
    Ok(())
}

/// Validates browser session settings
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.page_load_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page-load-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "browser window must be non-empty, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if config.fallback_wait_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fallback-wait-selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates vocabularies and alias tables
fn validate_vocabulary_config(config: &VocabularyConfig) -> Result<(), ConfigError> {
    if config.colors.is_empty() {
        return Err(ConfigError::Validation(
            "color vocabulary cannot be empty".to_string(),
        ));
    }

    if config.garments.is_empty() {
        return Err(ConfigError::Validation(
            "garment vocabulary cannot be empty".to_string(),
        ));
    }

    let terms = config.colors.iter().chain(config.garments.iter());
    for term in terms {
        if term.trim().is_empty() || term.to_lowercase() != *term {
            return Err(ConfigError::Validation(format!(
                "vocabulary terms must be non-empty and lowercase, got '{}'",
                term
            )));
        }
    }

    let aliases = config
        .color_abbreviations
        .iter()
        .chain(&config.color_synonyms)
        .chain(&config.type_synonyms);
    for alias in aliases {
        if alias.from.is_empty() || alias.to.is_empty() {
            return Err(ConfigError::Validation(format!(
                "alias entries need both sides, got '{}' -> '{}'",
                alias.from, alias.to
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    config
        .format
        .parse::<ExportFormat>()
        .map_err(ConfigError::Validation)?;

    Ok(())
}

/// Validates that a configured URL is absolute HTTP(S) with a host
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}
