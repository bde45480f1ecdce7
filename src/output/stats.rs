//! Batch statistics
//!
//! Counters collected while a batch runs, printed at the end of a CLI run.

use crate::product::{MissingField, UrlOutcome};
use std::collections::HashMap;

/// Scrape statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStatistics {
    /// Number of product URLs attempted
    pub urls_attempted: u64,

    /// Number of valid records produced
    pub products_extracted: u64,

    /// URLs for which no document could be obtained
    pub fetch_failures: u64,

    /// Browser fallbacks attempted after a failed direct fetch
    pub browser_fallbacks: u64,

    /// Records dropped by validation, by the first missing field
    pub invalid_by_field: HashMap<MissingField, u64>,
}

impl ScrapeStatistics {
    /// Records the outcome of one URL
    pub fn record(&mut self, outcome: &UrlOutcome) {
        self.urls_attempted += 1;
        match outcome {
            UrlOutcome::Extracted(_) => self.products_extracted += 1,
            UrlOutcome::FetchFailed => self.fetch_failures += 1,
            UrlOutcome::Invalid(field) => *self.invalid_by_field.entry(*field).or_insert(0) += 1,
        }
    }

    /// Total records dropped by validation
    pub fn invalid_total(&self) -> u64 {
        self.invalid_by_field.values().sum()
    }

    /// Share of attempted URLs that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.urls_attempted > 0 {
            (self.products_extracted as f64 / self.urls_attempted as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Scrape Statistics ===\n");

    println!("Overview:");
    println!("  Product URLs attempted: {}", stats.urls_attempted);
    println!("  Products extracted: {}", stats.products_extracted);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Browser fallbacks: {}", stats.browser_fallbacks);
    println!();

    if !stats.invalid_by_field.is_empty() {
        println!("Dropped by Validation ({}):", stats.invalid_total());
        let mut counts: Vec<_> = stats.invalid_by_field.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (field, count) in counts {
            println!("  missing {}: {}", field, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs extracted)",
        stats.success_rate(),
        stats.products_extracted,
        stats.urls_attempted
    );
}
