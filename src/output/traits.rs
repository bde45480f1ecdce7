//! Exporter trait and shared output types

use crate::product::ProductRecord;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// File formats products can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    /// One file of each format
    Both,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Both => "both",
        }
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    pub fn includes_csv(&self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "both" => Ok(Self::Both),
            other => Err(format!(
                "Unknown output format '{}', expected json, csv or both",
                other
            )),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for product exporters
///
/// Implementations write a whole batch of records to one file.
pub trait Exporter {
    /// File extension without the leading dot
    fn extension(&self) -> &'static str;

    /// Writes all products to `path`, replacing any existing file
    ///
    /// # Arguments
    ///
    /// * `products` - The records to write, in order
    /// * `path` - Destination file
    fn write(&self, products: &[ProductRecord], path: &Path) -> OutputResult<()>;
}
