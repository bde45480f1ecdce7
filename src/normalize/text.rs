use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,!?]").expect("valid regex"));

/// Collapses runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Cleans free text for export
///
/// Whitespace is collapsed and every character other than word characters,
/// whitespace, `-`, `.`, `,`, `!` and `?` is dropped.
///
/// # Examples
///
/// ```
/// use sku_scraper::normalize::clean_text;
///
/// assert_eq!(clean_text("  Astr   Maeve\n Midi Dress ™ "), "Astr Maeve Midi Dress");
/// ```
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text, " ");
    let cleaned = DISALLOWED.replace_all(&collapsed, "");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}
