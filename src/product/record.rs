use serde::Serialize;
use std::fmt;

/// One extracted product
///
/// Built field by field while the extractors run; a later step may
/// overwrite an earlier tentative value. Only records that pass
/// [`validate_record`] are handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    /// Absolute URL of the product page
    pub url: String,

    /// Brand-prefixed product id or a site-native SKU/style code
    pub sku_code: Option<String>,

    /// Site-internal numeric item number (6+ digits)
    pub item_number: Option<String>,

    /// Normalized color
    pub color: Option<String>,

    /// Normalized garment type
    #[serde(rename = "type")]
    pub garment_type: Option<String>,

    /// Brand name, the site's own name when nothing better is found
    pub brand: String,

    /// Cleaned free-text description
    pub description: Option<String>,
}

impl ProductRecord {
    /// Creates an empty working record for a URL
    pub fn new(url: impl Into<String>, default_brand: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sku_code: None,
            item_number: None,
            color: None,
            garment_type: None,
            brand: default_brand.into(),
            description: None,
        }
    }

    /// Returns true if the record carries both required fields
    pub fn is_valid(&self) -> bool {
        validate_record(self).is_ok()
    }
}

/// Required field a record was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingField {
    SkuCode,
    GarmentType,
}

impl MissingField {
    /// Converts to the output key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkuCode => "sku_code",
            Self::GarmentType => "type",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks the validity gate: identifier and garment type must be non-empty
///
/// The identifier is checked first, so a record missing both reports
/// [`MissingField::SkuCode`].
pub fn validate_record(record: &ProductRecord) -> Result<(), MissingField> {
    fn present(value: &Option<String>) -> bool {
        value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }

    if !present(&record.sku_code) {
        return Err(MissingField::SkuCode);
    }
    if !present(&record.garment_type) {
        return Err(MissingField::GarmentType);
    }
    Ok(())
}

/// What happened to a single URL during a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlOutcome {
    /// A valid record was produced
    Extracted(ProductRecord),

    /// No document could be obtained in any mode
    FetchFailed,

    /// A document was fetched but the record failed validation
    Invalid(MissingField),
}

impl UrlOutcome {
    /// Converts the outcome into the record it carries, if any
    pub fn into_record(self) -> Option<ProductRecord> {
        match self {
            Self::Extracted(record) => Some(record),
            Self::FetchFailed | Self::Invalid(_) => None,
        }
    }

    /// Short label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extracted(_) => "extracted",
            Self::FetchFailed => "fetch_failed",
            Self::Invalid(_) => "invalid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        let mut record = ProductRecord::new(
            "https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947",
            "Nordstrom",
        );
        record.sku_code = Some("NORD-7737947".to_string());
        record.garment_type = Some("dress".to_string());
        record
    }

    #[test]
    fn test_new_record_defaults_brand() {
        let record = ProductRecord::new("https://example.com/s/x/123456", "Nordstrom");
        assert_eq!(record.brand, "Nordstrom");
        assert!(record.sku_code.is_none());
        assert!(!record.is_valid());
    }

    #[test]
    fn test_valid_record() {
        assert_eq!(validate_record(&record()), Ok(()));
    }

    #[test]
    fn test_missing_type_is_invalid() {
        let mut record = record();
        record.garment_type = None;
        assert_eq!(validate_record(&record), Err(MissingField::GarmentType));
    }

    #[test]
    fn test_blank_sku_is_invalid() {
        let mut record = record();
        record.sku_code = Some("   ".to_string());
        assert_eq!(validate_record(&record), Err(MissingField::SkuCode));
    }

    #[test]
    fn test_missing_both_reports_sku_first() {
        let record = ProductRecord::new("https://example.com/", "Nordstrom");
        assert_eq!(validate_record(&record), Err(MissingField::SkuCode));
    }

    #[test]
    fn test_serializes_type_key() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["type"], "dress");
        assert!(value.get("garment_type").is_none());
    }

    #[test]
    fn test_outcome_into_record() {
        assert!(UrlOutcome::Extracted(record()).into_record().is_some());
        assert!(UrlOutcome::FetchFailed.into_record().is_none());
        assert_eq!(
            UrlOutcome::Invalid(MissingField::GarmentType).as_str(),
            "invalid"
        );
    }
}
