use url::Url;

/// Extracts the lowercase host of a URL with any `www.` prefix removed
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sku_scraper::url::site_host;
///
/// let url = Url::parse("https://WWW.Nordstrom.com/s/dress/1").unwrap();
/// assert_eq!(site_host(&url), Some("nordstrom.com".to_string()));
/// ```
pub fn site_host(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_lowercase();
        match host.strip_prefix("www.") {
            Some(bare) => bare.to_string(),
            None => host,
        }
    })
}

/// Returns true if both URLs point at the same site, ignoring `www.`
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
