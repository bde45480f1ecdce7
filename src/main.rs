//! SKU scraper main entry point
//!
//! This is the command-line interface for the product SKU scraper.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use sku_scraper::config::load_config_or_default;
use sku_scraper::crawler::{BatchStatus, FetchMode, ScrapeReport, Scraper};
use sku_scraper::output::{export_products, print_statistics, ExportFormat};
use tracing_subscriber::EnvFilter;

/// SKU scraper: product records from search results, categories and product pages
///
/// Exactly one of --search, --category or --urls selects what to scrape.
/// Extracted products are exported as JSON and/or CSV.
#[derive(Parser, Debug)]
#[command(name = "sku-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Scrape product SKU records from a retail site", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["search", "category", "urls"])
))]
struct Cli {
    /// Search by keyword, then scrape the matching products
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Scrape the products listed on a category page
    #[arg(long, value_name = "URL")]
    category: Option<String>,

    /// Scrape these product URLs
    #[arg(long, value_name = "URL", num_args = 1..)]
    urls: Vec<String>,

    /// Maximum number of search results to scrape
    #[arg(long, default_value_t = 50)]
    max_results: usize,

    /// Maximum number of category products to scrape
    #[arg(long, default_value_t = 100)]
    max_products: usize,

    /// Render pages in a headless browser instead of fetching them directly
    #[arg(long)]
    render: bool,

    /// Path to TOML configuration file (site defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format: json, csv or both (overrides the config file)
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<ExportFormat>,

    /// Output directory (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sku_scraper=info,warn"),
            1 => EnvFilter::new("sku_scraper=debug,info"),
            2 => EnvFilter::new("sku_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs one scrape; returns true if any product was extracted
async fn run(cli: Cli) -> anyhow::Result<bool> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    let format = match cli.format {
        Some(format) => format,
        None => config
            .output
            .format
            .parse::<ExportFormat>()
            .map_err(anyhow::Error::msg)?,
    };
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let site_name = config.site.name.clone();

    let mode = if cli.render {
        FetchMode::Rendered
    } else {
        FetchMode::Direct
    };
    tracing::info!("Scraping {} ({} mode)", config.site.base_url, mode);

    let scraper = Scraper::new(config, mode)?;
    spawn_interrupt_listener(&scraper);

    let report = handle_scrape(&scraper, &cli).await?;
    log_status(&report);

    if report.has_products() {
        let paths = export_products(&report.products, format, &output_dir, &site_name)?;
        for path in &paths {
            println!("✓ Exported to: {}", path.display());
        }
    } else {
        tracing::warn!("No products extracted");
    }

    println!();
    print_statistics(&report.stats);

    Ok(report.has_products())
}

/// Dispatches to the selected scrape mode
async fn handle_scrape(scraper: &Scraper, cli: &Cli) -> anyhow::Result<ScrapeReport> {
    if let Some(query) = &cli.search {
        let urls = scraper.search_products(query, cli.max_results).await?;
        if urls.is_empty() {
            tracing::warn!("No products found for '{}'", query);
        }
        return Ok(scraper.scrape_product_urls(&urls).await);
    }

    if let Some(category) = &cli.category {
        return Ok(scraper.scrape_category(category, cli.max_products).await?);
    }

    Ok(scraper.scrape_product_urls(&cli.urls).await)
}

/// Cancels running batches on Ctrl-C
fn spawn_interrupt_listener(scraper: &Scraper) {
    let token = scraper.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current product");
            token.cancel();
        }
    });
}

fn log_status(report: &ScrapeReport) {
    match &report.status {
        BatchStatus::Completed => tracing::info!(
            "Scrape completed with {} products",
            report.products.len()
        ),
        BatchStatus::Interrupted => tracing::warn!(
            "Scrape interrupted, keeping {} products",
            report.products.len()
        ),
        BatchStatus::Aborted { reason } => tracing::error!(
            "Scrape aborted ({}), keeping {} products",
            reason,
            report.products.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["sku-scraper"]).is_err());
        assert!(Cli::try_parse_from([
            "sku-scraper",
            "--search",
            "dress",
            "--category",
            "https://www.nordstrom.com/browse/women"
        ])
        .is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sku-scraper", "--search", "midi dress"]).unwrap();
        assert_eq!(cli.max_results, 50);
        assert_eq!(cli.max_products, 100);
        assert!(!cli.render);
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_url_list_and_format() {
        let cli = Cli::try_parse_from([
            "sku-scraper",
            "--urls",
            "https://www.nordstrom.com/s/a/1111111",
            "https://www.nordstrom.com/s/b/2222222",
            "--format",
            "csv",
            "--render",
        ])
        .unwrap();
        assert_eq!(cli.urls.len(), 2);
        assert_eq!(cli.format, Some(ExportFormat::Csv));
        assert!(cli.render);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let parsed = Cli::try_parse_from(["sku-scraper", "--search", "dress", "--format", "xml"]);
        assert_eq!(parsed.unwrap_err().kind(), ErrorKind::ValueValidation);
    }
}
