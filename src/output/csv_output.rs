use super::traits::{Exporter, OutputResult};
use crate::product::ProductRecord;
use std::path::Path;

/// Column order of the CSV export
pub const CSV_COLUMNS: [&str; 6] = ["sku_code", "color", "type", "brand", "description", "url"];

/// Writes products as a fixed-column CSV file with a header row
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, products: &[ProductRecord], path: &Path) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_COLUMNS)?;

        for product in products {
            writer.write_record([
                product.sku_code.as_deref().unwrap_or(""),
                product.color.as_deref().unwrap_or(""),
                product.garment_type.as_deref().unwrap_or(""),
                product.brand.as_str(),
                product.description.as_deref().unwrap_or(""),
                product.url.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
