//! Output module for exporting scraped products
//!
//! This module handles:
//! - Writing product records as JSON and CSV files
//! - Naming export files by site and timestamp
//! - Recording and printing batch statistics

mod csv_output;
mod json;
pub mod stats;
mod traits;

pub use csv_output::{CsvExporter, CSV_COLUMNS};
pub use json::JsonExporter;
pub use stats::{print_statistics, ScrapeStatistics};
pub use traits::{ExportFormat, Exporter, OutputError, OutputResult};

use crate::product::ProductRecord;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Exports products in the requested format(s)
///
/// Files are named `{site}_skus_{YYYYmmdd_HHMMSS}.{ext}` inside
/// `output_dir`, which is created if missing.
///
/// # Arguments
///
/// * `products` - The records to export
/// * `format` - JSON, CSV, or both
/// * `output_dir` - Destination directory
/// * `site_name` - Used as the file name prefix
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths of the written files
/// * `Err(OutputError)` - Failed to create the directory or write a file
pub fn export_products(
    products: &[ProductRecord],
    format: ExportFormat,
    output_dir: &Path,
    site_name: &str,
) -> OutputResult<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let stem = format!(
        "{}_skus_{}",
        file_prefix(site_name),
        Local::now().format("%Y%m%d_%H%M%S")
    );

    let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();
    if format.includes_json() {
        exporters.push(Box::new(JsonExporter));
    }
    if format.includes_csv() {
        exporters.push(Box::new(CsvExporter));
    }

    let mut written = Vec::new();
    for exporter in exporters {
        let path = output_dir.join(format!("{}.{}", stem, exporter.extension()));
        exporter.write(products, &path)?;
        tracing::info!("Exported {} products to {}", products.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Lowercase file-name-safe form of a site name
fn file_prefix(site_name: &str) -> String {
    let prefix: String = site_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if prefix.is_empty() {
        "products".to_string()
    } else {
        prefix
    }
}
