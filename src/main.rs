//! CES Harvest main entry point
//!
//! This is the command-line interface for the CES registry harvester.

use ces_harvest::config::{load_config_with_hash, validate, Config};
use ces_harvest::harvest::Coordinator;
use ces_harvest::output::print_report;
use ces_harvest::state::Category;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CES Harvest: a listing harvester for the CES certification registry
///
/// Walks the listing pages of each registry category, fetches every listed
/// project's page, and writes one consolidated, deduplicated CSV table.
#[derive(Parser, Debug)]
#[command(name = "ces-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A listing harvester for the CES certification registry", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with = "consolidate_only")]
    dry_run: bool,

    /// Consolidate the intermediate tables already in the output directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    consolidate_only: bool,

    /// Harvest only this category (repeatable); overrides the config file
    #[arg(long = "category", value_name = "ID")]
    categories: Vec<Category>,

    /// Output directory; overrides the config file
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    let run_date = chrono::Local::now().date_naive();

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, run_date)?;
    } else if cli.consolidate_only {
        handle_consolidate(config, run_date)?;
    } else {
        tokio::select! {
            result = handle_harvest(config, run_date) => result?,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Process interrupted by user");
            }
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ces_harvest=info,warn"),
            1 => EnvFilter::new("ces_harvest=debug,info"),
            2 => EnvFilter::new("ces_harvest=trace,debug"),
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

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.categories.is_empty() {
        config.harvest.categories = cli.categories.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(
    config: &Config,
    run_date: chrono::NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::new(config.clone(), run_date)?;
    let layout = coordinator.layout();

    println!("=== CES Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.harvest.base_url);

    println!("\nFetching:");
    println!("  Max attempts per URL: {}", config.fetch.max_retries);
    println!("  Retry sleep: {}ms", config.fetch.retry_sleep_ms);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nDetail Pages:");
    println!("  Concurrency: {}", config.detail.concurrency);
    println!("  Progress every: {} pages", config.detail.progress_every);

    println!("\nCategories ({}):", config.harvest.categories.len());
    for &category in &config.harvest.categories {
        println!("  - {}", category);
        println!("    * summary: {}", layout.summary_path(category).display());
        println!("    * detail: {}", layout.detail_path(category).display());
    }

    println!("\nOutput:");
    println!("  Directory: {}", layout.directory().display());
    println!("  Consolidated: {}", layout.consolidated_path().display());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest {} categories",
        config.harvest.categories.len()
    );

    Ok(())
}

/// Handles the --consolidate-only mode: merges existing intermediate tables
fn handle_consolidate(
    config: Config,
    run_date: chrono::NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = Coordinator::new(config, run_date)?;
    tracing::info!(
        "Consolidating tables in {}",
        coordinator.layout().directory().display()
    );

    match coordinator.consolidate_existing()? {
        Some(outcome) => println!(
            "✓ Consolidated {} rows from {} tables into {}",
            outcome.rows,
            outcome.sources,
            outcome.path.display()
        ),
        None => println!("Nothing to consolidate"),
    }

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    run_date: chrono::NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Categories: {}",
        config
            .harvest
            .categories
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let coordinator = Coordinator::new(config, run_date)?;
    let report = coordinator.run().await;
    print_report(&report);

    let failed = report.failed_categories();
    if failed.is_empty() {
        tracing::info!("Harvest completed successfully");
    } else {
        tracing::warn!(
            "Harvest completed; {} categories stopped early",
            failed.len()
        );
    }

    Ok(())
}
