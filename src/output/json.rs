use super::traits::{Exporter, OutputResult};
use crate::product::ProductRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One exported object; absent fields become `null`
#[derive(Debug, Serialize)]
struct JsonRow<'a> {
    sku_code: Option<&'a str>,
    color: Option<&'a str>,
    #[serde(rename = "type")]
    garment_type: Option<&'a str>,
    brand: &'a str,
    description: Option<&'a str>,
}

impl<'a> From<&'a ProductRecord> for JsonRow<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            sku_code: record.sku_code.as_deref(),
            color: record.color.as_deref(),
            garment_type: record.garment_type.as_deref(),
            brand: &record.brand,
            description: record.description.as_deref(),
        }
    }
}

/// Writes products as a pretty-printed JSON array
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, products: &[ProductRecord], path: &Path) -> OutputResult<()> {
        let rows: Vec<JsonRow<'_>> = products.iter().map(JsonRow::from).collect();

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
