//! Run report
//!
//! Collects per-category counts during a run and prints them once the run is
//! over.

use crate::output::consolidate::ConsolidationOutcome;
use crate::state::Category;
use std::path::PathBuf;
use std::time::Duration;

/// What happened to one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,

    /// Listing pages the category has
    pub total_pages: u32,

    /// Listing pages fetched and extracted
    pub pages_harvested: u32,

    /// Summary records after deduplication
    pub summaries: usize,

    /// Detail records written
    pub details: usize,

    /// Detail pages that could not be fetched
    pub detail_failures: usize,

    /// Diagnostic line when the category stopped early
    pub failure: Option<String>,
}

impl CategoryReport {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            total_pages: 0,
            pages_harvested: 0,
            summaries: 0,
            details: 0,
            detail_failures: 0,
            failure: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of one harvest run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub categories: Vec<CategoryReport>,

    /// Final table, when consolidation wrote one
    pub consolidated: Option<ConsolidationOutcome>,

    /// Consolidation error, when writing the final table failed
    pub consolidation_error: Option<String>,

    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_summaries(&self) -> usize {
        self.categories.iter().map(|c| c.summaries).sum()
    }

    pub fn total_details(&self) -> usize {
        self.categories.iter().map(|c| c.details).sum()
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| !c.is_complete())
            .map(|c| c.category)
            .collect()
    }

    pub fn consolidated_path(&self) -> Option<&PathBuf> {
        self.consolidated.as_ref().map(|c| &c.path)
    }
}

/// Prints a run report to stdout
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    println!("Categories:");
    for category in &report.categories {
        let status = if category.is_complete() { "ok" } else { "FAILED" };
        println!(
            "  {:<18} {:>4}/{:<4} pages  {:>5} listed  {:>5} detailed  {:>3} dropped  [{}]",
            category.category.as_str(),
            category.pages_harvested,
            category.total_pages,
            category.summaries,
            category.details,
            category.detail_failures,
            status
        );
    }
    println!();

    let failed = report.failed_categories();
    if !failed.is_empty() {
        println!("Stopped Early ({}):", failed.len());
        for category in report.categories.iter().filter(|c| !c.is_complete()) {
            if let Some(failure) = &category.failure {
                println!("  - {}", failure);
            }
        }
        println!();
    }

    println!("Totals:");
    println!("  Summary records: {}", report.total_summaries());
    println!("  Detail records: {}", report.total_details());
    match (&report.consolidated, &report.consolidation_error) {
        (Some(outcome), _) => println!(
            "  Consolidated: {} rows from {} tables -> {}",
            outcome.rows,
            outcome.sources,
            outcome.path.display()
        ),
        (None, Some(error)) => println!("  Consolidation failed: {}", error),
        (None, None) => println!("  Consolidated: nothing to consolidate"),
    }
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
}
