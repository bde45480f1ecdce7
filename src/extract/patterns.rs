use once_cell::sync::Lazy;
use regex::Regex;

/// SKU-shaped codes, most specific first
static SKU_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)SKU[:\s]+([A-Z0-9\-]+)",
        r"(?i)Style[:\s]+([A-Z0-9\-]+)",
        r"(?i)Item[:\s]+([A-Z0-9\-]+)",
        r"(?i)\b([A-Z]{2,}\d{4,})\b",
        r"\b(\d{6,})\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static LONG_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{6,}").expect("valid regex"));

/// Finds a SKU or style code in a span of text
///
/// Labelled codes (`SKU:`, `Style:`, `Item:`) win over bare codes; a bare
/// code is either 2+ letters followed by 4+ digits or a run of 6+ digits.
/// The match is returned upper-cased.
///
/// # Examples
///
/// ```
/// use sku_scraper::extract::extract_sku;
///
/// assert_eq!(extract_sku("Style: abc123"), Some("ABC123".to_string()));
/// assert_eq!(extract_sku("Ref nord12345 in stock"), Some("NORD12345".to_string()));
/// assert_eq!(extract_sku("no code here"), None);
/// ```
pub fn extract_sku(text: &str) -> Option<String> {
    SKU_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Returns the first run of 6 or more digits
pub fn first_long_number(text: &str) -> Option<String> {
    LONG_NUMBER.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_codes_first() {
        assert_eq!(extract_sku("SKU: 12-AB"), Some("12-AB".to_string()));
        assert_eq!(
            extract_sku("Style ABC123 / 9876543"),
            Some("ABC123".to_string())
        );
        assert_eq!(extract_sku("Item: x7-2"), Some("X7-2".to_string()));
    }

    #[test]
    fn test_bare_alphanumeric_before_digits() {
        assert_eq!(
            extract_sku("ref 1234567 code NR5521"),
            Some("NR5521".to_string())
        );
    }

    #[test]
    fn test_bare_digits() {
        assert_eq!(extract_sku("ref 1234567"), Some("1234567".to_string()));
        assert_eq!(extract_sku("ref 12345"), None);
    }

    #[test]
    fn test_first_long_number() {
        assert_eq!(
            first_long_number("Item #: 7737947-01"),
            Some("7737947".to_string())
        );
        assert_eq!(first_long_number("12345"), None);
    }
}
