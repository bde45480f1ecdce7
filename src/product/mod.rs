//! Product record model
//!
//! This module defines the canonical record produced for every product page
//! and the validity gate that decides whether it reaches the output.

mod record;

pub use record::{validate_record, MissingField, ProductRecord, UrlOutcome};
