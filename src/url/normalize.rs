use url::Url;

/// Resolves an anchor href against the page it was found on
///
/// Empty hrefs, same-page anchors and non-navigational schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`) are skipped. Only HTTP(S)
/// results are returned.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base_url` - The URL of the page containing the link
///
/// # Returns
///
/// * `Some(Url)` - The absolute link target
/// * `None` - The href is not a followable link
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sku_scraper::url::resolve_link;
///
/// let base = Url::parse("https://www.nordstrom.com/browse/women/dresses").unwrap();
/// let link = resolve_link("/s/maeve-dress/7737947", &base).unwrap();
/// assert_eq!(link.as_str(), "https://www.nordstrom.com/s/maeve-dress/7737947");
/// assert!(resolve_link("mailto:help@nordstrom.com", &base).is_none());
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Returns the URL with its query string and fragment removed
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sku_scraper::url::strip_query;
///
/// let url = Url::parse("https://www.nordstrom.com/s/dress/123456?color=red#reviews").unwrap();
/// assert_eq!(strip_query(&url).as_str(), "https://www.nordstrom.com/s/dress/123456");
/// ```
pub fn strip_query(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped
}
