//! URL handling module
//!
//! This module provides product path classification, link resolution,
//! query stripping and same-site checks.

mod domain;
mod normalize;

use once_cell::sync::Lazy;
use regex::Regex;

// Re-export main functions
pub use domain::{is_same_site, site_host};
pub use normalize::{resolve_link, strip_query};

/// `/s/{slug}/{digits}` product detail path
static PRODUCT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/s/[^/]+/(\d+)").expect("valid regex"));

/// `/s/{slug}/{digits}` anywhere in a URL
static PRODUCT_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/s/[^/]+/(\d+)").expect("valid regex"));

/// Legacy `/browse/{a}/{b}/{digits}` anywhere in a URL
static LEGACY_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/browse/[^/]+/[^/]+/(\d+)").expect("valid regex"));

/// Trailing `/{digits}` of a legacy listing path
static TRAILING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+$").expect("valid regex"));

/// Returns true if a URL path points at a product page
///
/// Accepts the current `/s/{slug}/{digits}` layout, and the legacy layout:
/// paths that contain `/browse/` and end in a numeric segment.
///
/// # Examples
///
/// ```
/// use sku_scraper::url::is_product_path;
///
/// assert!(is_product_path("/s/astr-maeve-midi-dress/7737947"));
/// assert!(is_product_path("/browse/women/dresses/7737947"));
/// assert!(!is_product_path("/browse/women/dresses"));
/// ```
pub fn is_product_path(path: &str) -> bool {
    PRODUCT_PATH.is_match(path) || (path.contains("/browse/") && TRAILING_ID.is_match(path))
}

/// Extracts the numeric product id embedded in a product URL
///
/// Tries the `/s/{slug}/{digits}` shape, then the legacy
/// `/browse/{a}/{b}/{digits}` shape.
pub fn product_id_from_url(url: &str) -> Option<String> {
    [&*PRODUCT_URL, &*LEGACY_URL]
        .into_iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns true if the URL contains any excluded path fragment
///
/// Matching is case-insensitive on the full URL string.
pub fn is_excluded(url: &str, excluded_paths: &[String]) -> bool {
    let lowered = url.to_lowercase();
    excluded_paths
        .iter()
        .any(|fragment| lowered.contains(&fragment.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded() -> Vec<String> {
        vec![
            "/customer-service/".to_string(),
            "/help/".to_string(),
            "/sale?".to_string(),
        ]
    }

    #[test]
    fn test_primary_path() {
        assert!(is_product_path("/s/xscape-evenings-ruffle-dress/7746484"));
    }

    #[test]
    fn test_primary_requires_leading_segment() {
        assert!(!is_product_path("/en/s/dress/7746484"));
        assert!(!is_product_path("/s/dress/latest"));
    }

    #[test]
    fn test_legacy_path() {
        assert!(is_product_path("/browse/women/clothing/item/123456"));
        assert!(!is_product_path("/browse/women/clothing"));
    }

    #[test]
    fn test_product_id_from_url() {
        assert_eq!(
            product_id_from_url("https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947"),
            Some("7737947".to_string())
        );
        assert_eq!(
            product_id_from_url("https://www.nordstrom.com/browse/women/dresses/5551234?color=red"),
            Some("5551234".to_string())
        );
        assert_eq!(
            product_id_from_url("https://www.nordstrom.com/browse/women"),
            None
        );
    }

    #[test]
    fn test_primary_shape_preferred_over_legacy() {
        assert_eq!(
            product_id_from_url("https://example.com/browse/a/b/111111/s/slug/222222"),
            Some("222222".to_string())
        );
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(
            "https://www.nordstrom.com/Customer-Service/s/returns/123456",
            &excluded()
        ));
        assert!(is_excluded(
            "https://www.nordstrom.com/browse/sale?page=2",
            &excluded()
        ));
        assert!(!is_excluded(
            "https://www.nordstrom.com/s/dress/123456",
            &excluded()
        ));
    }
}
