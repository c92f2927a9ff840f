//! Harvest coordinator - main run orchestration
//!
//! This module drives a complete run:
//! - Harvesting each configured category in turn
//! - Fetching the detail page of every listed project
//! - Consolidating the categories into the final table
//! - Reporting what happened

use crate::config::{validate, Config};
use crate::harvest::category::{CategoryHarvester, CategoryOutcome};
use crate::harvest::detail::DetailHarvester;
use crate::harvest::paginator::Paginator;
use crate::harvest::Fetcher;
use crate::output::{
    scan_artifacts, ArtifactLayout, CategoryArtifacts, CategoryReport, ConsolidationOutcome,
    ConsolidationPlan, Consolidator, OutputResult, RunReport,
};
use crate::state::Category;
use crate::HarvestError;
use chrono::NaiveDate;
use std::time::Instant;

/// Main harvest coordinator
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
    paginator: Paginator,
    layout: ArtifactLayout,
}

impl Coordinator {
    /// Creates a coordinator for a run stamped with `run_date`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client setup
    ///   failure; nothing has been fetched
    pub fn new(config: Config, run_date: NaiveDate) -> Result<Self, HarvestError> {
        validate(&config)?;

        let fetcher = Fetcher::new(&config.fetch)?;
        let paginator = Paginator::new(&config.harvest.base_url)?;
        let layout = ArtifactLayout::new(config.output.directory.clone(), run_date);

        Ok(Self {
            config,
            fetcher,
            paginator,
            layout,
        })
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Runs every configured category, then consolidates
    ///
    /// Category failures are recorded in the report; consolidation is always
    /// attempted with whatever detail tables were written.
    pub async fn run(&self) -> RunReport {
        let start_time = Instant::now();
        let categories = &self.config.harvest.categories;
        tracing::info!(
            "Starting harvest of {} categories from {}",
            categories.len(),
            self.config.harvest.base_url
        );

        let mut report = RunReport::default();
        let mut artifacts = Vec::with_capacity(categories.len());

        for &category in categories {
            let (category_report, category_artifacts) = self.harvest_category(category).await;
            report.categories.push(category_report);
            artifacts.push(category_artifacts);
        }

        let plan = ConsolidationPlan::from_artifacts(&artifacts);
        match self.consolidate(&plan) {
            Ok(outcome) => report.consolidated = outcome,
            Err(e) => {
                tracing::error!("Consolidation failed: {}", e);
                report.consolidation_error = Some(e.to_string());
            }
        }

        report.elapsed = start_time.elapsed();
        tracing::info!(
            "Harvest finished in {:.2} seconds",
            report.elapsed.as_secs_f64()
        );
        report
    }

    /// Harvests one category: listing pages, then project pages
    pub async fn harvest_category(&self, category: Category) -> (CategoryReport, CategoryArtifacts) {
        tracing::info!("Processing category: {}", category);

        let outcome = CategoryHarvester::new(&self.fetcher, &self.paginator, &self.layout)
            .harvest(category)
            .await;

        let mut report = CategoryReport::new(category);
        let mut artifacts = CategoryArtifacts::new(category);
        report.total_pages = outcome.total_pages;
        report.pages_harvested = outcome.pages_harvested;
        report.summaries = outcome.summaries.len();
        report.failure = outcome.failure.clone();
        artifacts.summary = outcome.summary_path.clone();
        artifacts.diagnostic = outcome.diagnostic_path.clone();

        if outcome.summaries.is_empty() {
            return (report, artifacts);
        }

        self.harvest_details(&outcome, &mut report, &mut artifacts)
            .await;
        (report, artifacts)
    }

    async fn harvest_details(
        &self,
        outcome: &CategoryOutcome,
        report: &mut CategoryReport,
        artifacts: &mut CategoryArtifacts,
    ) {
        let category = outcome.category;
        let details = DetailHarvester::new(
            &self.fetcher,
            self.config.detail.concurrency,
            self.config.detail.progress_every,
        )
        .harvest(category, &outcome.summaries)
        .await;

        report.details = details.records.len();
        report.detail_failures = details.failures.len();

        let path = self.layout.detail_path(category);
        match details.persist(&path) {
            Ok(()) => artifacts.detail = Some(path),
            Err(e) => tracing::error!("Could not save {}: {}", path.display(), e),
        }
    }

    /// Consolidates the artifacts named in `plan`
    pub fn consolidate(&self, plan: &ConsolidationPlan) -> OutputResult<Option<ConsolidationOutcome>> {
        Consolidator::new(self.layout.consolidated_path()).consolidate(plan)
    }

    /// Consolidates the intermediate artifacts already in the output directory
    pub fn consolidate_existing(&self) -> OutputResult<Option<ConsolidationOutcome>> {
        let plan = scan_artifacts(self.layout.directory())?;
        self.consolidate(&plan)
    }
}

/// Runs a complete harvest
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `run_date` - Date stamped into every artifact name
///
/// # Returns
///
/// * `Ok(RunReport)` - The run completed; individual categories may have failed
/// * `Err(HarvestError)` - The run could not start
pub async fn run_harvest(config: Config, run_date: NaiveDate) -> Result<RunReport, HarvestError> {
    let coordinator = Coordinator::new(config, run_date)?;
    Ok(coordinator.run().await)
}
