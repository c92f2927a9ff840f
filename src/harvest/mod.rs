//! Harvest module for listing and project page processing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with bounded retries
//! - HTML extraction of summary and detail records
//! - Pagination discovery
//! - Per-category and per-project harvesting
//! - Overall run coordination

mod category;
mod coordinator;
mod detail;
mod extractor;
mod fetcher;
mod paginator;
mod retry;

pub use category::{CategoryHarvester, CategoryOutcome};
pub use coordinator::{run_harvest, Coordinator};
pub use detail::{DetailHarvester, DetailOutcome};
pub use extractor::{
    deinterleave, extract_detail, extract_page_numbers, extract_summaries, normalize_label,
    secure_scheme,
};
pub use fetcher::{build_http_client, FetchError, FetchFailure, Fetcher};
pub use paginator::{count_pages, PageDiscovery, Paginator};
pub use retry::{retry, Backoff, RetryError, RetryPolicy};

use crate::config::Config;
use crate::output::RunReport;
use crate::HarvestError;
use chrono::NaiveDate;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Walk the listing pages of every category
/// 3. Fetch the detail page of every listed project
/// 4. Consolidate all categories into one table
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `run_date` - Date stamped into every artifact name
///
/// # Returns
///
/// * `Ok(RunReport)` - The run completed; see the report for failed categories
/// * `Err(HarvestError)` - The run could not start
pub async fn harvest(config: Config, run_date: NaiveDate) -> Result<RunReport, HarvestError> {
    run_harvest(config, run_date).await
}
