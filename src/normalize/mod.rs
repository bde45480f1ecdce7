//! Vocabulary normalization for extracted product attributes
//!
//! Maps raw color and garment text onto the configured canonical
//! vocabularies. Both normalizers are total: unrecognized input passes
//! through lowercased and trimmed instead of failing.

mod text;

pub use text::{clean_text, collapse_whitespace};

use crate::config::{Alias, VocabularyConfig};

/// Canonical color and garment vocabularies with their alias tables
///
/// # Example
///
/// ```
/// use sku_scraper::config::VocabularyConfig;
/// use sku_scraper::normalize::Vocabulary;
///
/// let vocab = Vocabulary::from_config(&VocabularyConfig::default());
/// assert_eq!(vocab.normalize_color("Navy Blue"), Some("navy".to_string()));
/// assert_eq!(vocab.normalize_type("Trousers"), Some("pants".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Vocabulary {
    colors: Vec<String>,
    garments: Vec<String>,
    color_abbreviations: Vec<Alias>,
    color_synonyms: Vec<Alias>,
    type_synonyms: Vec<Alias>,
}

impl Vocabulary {
    pub fn from_config(config: &VocabularyConfig) -> Self {
        Self {
            colors: config.colors.clone(),
            garments: config.garments.clone(),
            color_abbreviations: config.color_abbreviations.clone(),
            color_synonyms: config.color_synonyms.clone(),
            type_synonyms: config.type_synonyms.clone(),
        }
    }

    /// Finds the color term occurring first in `text`, if any
    pub fn find_color(&self, text: &str) -> Option<&str> {
        find_term(&self.colors, text)
    }

    /// Finds the garment term occurring first in `text`, if any
    pub fn find_garment(&self, text: &str) -> Option<&str> {
        find_term(&self.garments, text)
    }

    /// Normalizes raw color text
    ///
    /// 1. A vocabulary term found in the text wins (`grey` is unified to `gray`)
    /// 2. Otherwise the first abbreviation found maps to its full name
    /// 3. Otherwise the lowercased, trimmed input is returned unchanged
    ///
    /// Returns None only for blank input.
    pub fn normalize_color(&self, text: &str) -> Option<String> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        if let Some(term) = find_term(&self.colors, &lowered) {
            return Some(rewrite(&self.color_synonyms, term));
        }

        for alias in &self.color_abbreviations {
            if lowered.contains(alias.from.as_str()) {
                return Some(alias.to.clone());
            }
        }

        Some(lowered)
    }

    /// Normalizes raw garment type text
    ///
    /// A vocabulary term found in the text is collapsed through the synonym
    /// table (`tshirt` becomes `t-shirt`, `top` becomes `shirt`); anything
    /// else passes through lowercased and trimmed.
    pub fn normalize_type(&self, text: &str) -> Option<String> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        match find_term(&self.garments, &lowered) {
            Some(term) => Some(rewrite(&self.type_synonyms, term)),
            None => Some(lowered),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_config(&VocabularyConfig::default())
    }
}

/// Returns the term whose first occurrence in `text` starts earliest,
/// preferring the longer term when two start at the same offset
fn find_term<'v>(terms: &'v [String], text: &str) -> Option<&'v str> {
    let lowered = text.to_lowercase();

    terms
        .iter()
        .filter_map(|term| lowered.find(term.as_str()).map(|pos| (pos, term)))
        .min_by(|(pos_a, a), (pos_b, b)| pos_a.cmp(pos_b).then(b.len().cmp(&a.len())))
        .map(|(_, term)| term.as_str())
}

fn rewrite(aliases: &[Alias], term: &str) -> String {
    aliases
        .iter()
        .find(|alias| alias.from == term)
        .map(|alias| alias.to.clone())
        .unwrap_or_else(|| term.to_string())
}
