//! Field extraction for product pages
//!
//! Every field is located by an ordered list of independent probes:
//! - Attribute, CSS and label probes read specific markup
//! - Structured-data probes read `application/ld+json` blocks
//! - Pattern probes run regexes over the URL or the visible page text
//!
//! The first probe whose hit survives its refinement wins. A probe that
//! finds nothing is never an error; the field is simply left absent.

mod document;
mod fields;
mod patterns;
mod probe;

pub use document::{element_text, PageContext};
pub use fields::{FieldExtractor, Step};
pub use patterns::{extract_sku, first_long_number};
pub use probe::{NodeScope, Probe, Refine, Terms};

use crate::normalize::{clean_text, Vocabulary};
use crate::product::ProductRecord;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building the extractors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector {0}")]
    InvalidSelector(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// The full set of field extractors for one site
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use sku_scraper::extract::FieldExtractors;
/// use sku_scraper::normalize::Vocabulary;
///
/// let extractors = FieldExtractors::new(Arc::new(Vocabulary::default()), "NORD", "Nordstrom").unwrap();
/// let record = extractors.extract_record(
///     "https://www.nordstrom.com/s/astr-maeve-midi-dress/7737947",
///     "<h1>Astr Maeve Black Midi Dress</h1>",
/// );
/// assert_eq!(record.sku_code.as_deref(), Some("NORD-7737947"));
/// assert_eq!(record.color.as_deref(), Some("black"));
/// assert_eq!(record.garment_type.as_deref(), Some("dress"));
/// ```
#[derive(Debug)]
pub struct FieldExtractors {
    vocabulary: Arc<Vocabulary>,
    sku_prefix: String,
    default_brand: String,
    identifier: FieldExtractor,
    title: FieldExtractor,
    color: FieldExtractor,
    garment_type: FieldExtractor,
    brand: FieldExtractor,
    sku: FieldExtractor,
    item_number: FieldExtractor,
    description: FieldExtractor,
}

impl FieldExtractors {
    /// Compiles every probe list
    ///
    /// # Arguments
    ///
    /// * `vocabulary` - Color and garment vocabularies used by refinements
    /// * `sku_prefix` - Prefix for identifiers derived from a numeric product id
    /// * `default_brand` - Brand used when no brand can be extracted
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        sku_prefix: impl Into<String>,
        default_brand: impl Into<String>,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            vocabulary,
            sku_prefix: sku_prefix.into(),
            default_brand: default_brand.into(),
            identifier: fields::identifier()?,
            title: fields::title()?,
            color: fields::color()?,
            garment_type: fields::garment_type()?,
            brand: fields::brand()?,
            sku: fields::sku()?,
            item_number: fields::item_number()?,
            description: fields::description()?,
        })
    }

    /// Builds a working record from a fetched page
    ///
    /// Fields are filled in a fixed order and later steps may overwrite
    /// earlier ones: identifier, title, color, type, brand, SKU override,
    /// item number, then the description fallback. The record is returned
    /// unvalidated.
    pub fn extract_record(&self, url: &str, html: &str) -> ProductRecord {
        let page = PageContext::parse(url, html);
        let mut record = ProductRecord::new(url, self.default_brand.as_str());

        record.sku_code = self.run(&self.identifier, &page, None);

        let title = self.run(&self.title, &page, None);
        if let Some(title) = &title {
            record.description = non_empty(clean_text(title));
        }
        let title = title.as_deref();

        if let Some(color) = self.run(&self.color, &page, title) {
            record.color = self.vocabulary.normalize_color(&color);
        }

        if let Some(garment) = self.run(&self.garment_type, &page, title) {
            record.garment_type = self.vocabulary.normalize_type(&garment);
        }

        if let Some(brand) = self
            .run(&self.brand, &page, None)
            .and_then(|b| non_empty(clean_text(&b)))
        {
            record.brand = brand;
        }

        if let Some(sku) = self.run(&self.sku, &page, None) {
            record.sku_code = Some(sku);
        }

        record.item_number = self.run(&self.item_number, &page, None);

        if record.description.is_none() {
            record.description = self
                .run(&self.description, &page, None)
                .and_then(|d| non_empty(clean_text(&d)));
        }

        record
    }

    /// Runs one field's probes in order and returns the first refined hit
    fn run(
        &self,
        field: &FieldExtractor,
        page: &PageContext<'_>,
        title: Option<&str>,
    ) -> Option<String> {
        for (index, step) in field.steps.iter().enumerate() {
            let Some(raw) = step.probe.run(page, title) else {
                continue;
            };
            let Some(value) = step.refine.apply(&raw, &self.vocabulary, &self.sku_prefix) else {
                continue;
            };

            if matches!(step.probe, Probe::PageText) {
                tracing::warn!(
                    "Low-confidence {} '{}' from full page text at {}",
                    field.field,
                    value,
                    page.url()
                );
            } else {
                tracing::debug!(
                    "{} '{}' from {} probe #{}",
                    field.field,
                    value,
                    step.probe.kind(),
                    index
                );
            }
            return Some(value);
        }

        tracing::debug!("No {} found at {}", field.field, page.url());
        None
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
