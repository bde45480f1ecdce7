//! Configuration module for the scraper
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every value the core treats as a constant (header set, pacing,
//! retry policy, browser waits, site URLs, vocabularies, output defaults)
//! lives here and is passed in at construction.
//!
//! # Example
//!
//! ```no_run
//! use sku_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Scraping {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Alias, Config, HttpConfig, OutputConfig, RateLimitConfig, RenderConfig, SiteConfig,
    VocabularyConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
