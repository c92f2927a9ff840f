//! Category harvester
//!
//! Walks every listing page of one category, collecting summary records, and
//! persists the summary table. An error on any page stops the category and
//! writes a diagnostic; records already collected are kept.

use crate::harvest::extractor::extract_summaries;
use crate::harvest::paginator::Paginator;
use crate::harvest::Fetcher;
use crate::output::{append_diagnostic, write_records, ArtifactLayout};
use crate::records::SummaryRecord;
use crate::state::{Category, HarvestPhase, HarvestState};
use std::path::PathBuf;

/// Result of harvesting one category's listing pages
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: Category,

    /// Final phase; `Done` or `Failed`
    pub phase: HarvestPhase,

    pub total_pages: u32,

    /// Pages whose records were collected
    pub pages_harvested: u32,

    /// Deduplicated summary records
    pub summaries: Vec<SummaryRecord>,

    /// Diagnostic line, when the category stopped early
    pub failure: Option<String>,

    /// Summary table, when one was written
    pub summary_path: Option<PathBuf>,

    /// Diagnostic file, when one was written
    pub diagnostic_path: Option<PathBuf>,
}

/// Harvests the listing pages of a category
pub struct CategoryHarvester<'a> {
    fetcher: &'a Fetcher,
    paginator: &'a Paginator,
    layout: &'a ArtifactLayout,
}

impl<'a> CategoryHarvester<'a> {
    pub fn new(fetcher: &'a Fetcher, paginator: &'a Paginator, layout: &'a ArtifactLayout) -> Self {
        Self {
            fetcher,
            paginator,
            layout,
        }
    }

    /// Runs the category state machine to completion
    ///
    /// Never fails: page errors end the category in `Failed`, and output errors
    /// are logged and reflected as missing paths in the outcome.
    pub async fn harvest(&self, category: Category) -> CategoryOutcome {
        let mut state = HarvestState::new(category);

        let discovery = self.paginator.discover(self.fetcher, category).await;
        state.set_total_pages(discovery.total_pages);
        tracing::info!("{}: {} listing page(s)", category, state.total_pages());

        let mut first_page = discovery.first_page;
        while let Some(page) = state.next_page() {
            let url = match self.paginator.page_url(category, page) {
                Ok(url) => url,
                Err(e) => {
                    state.fail(format!("cannot build page URL: {}", e));
                    break;
                }
            };

            let body = match first_page.take().filter(|_| page == 1) {
                Some(body) => body,
                None => match self.fetcher.fetch(url.as_str()).await {
                    Ok(body) => body,
                    Err(e) => {
                        state.fail(e.to_string());
                        break;
                    }
                },
            };

            match extract_summaries(&body) {
                Ok(records) => {
                    let found = records.len();
                    state.accumulate(records);
                    tracing::info!(
                        "Processing page {}/{} of {}: {} projects ({} so far)",
                        page,
                        state.total_pages(),
                        state.category(),
                        found,
                        state.summaries().len()
                    );
                }
                Err(e) => {
                    state.fail(format!("{}: {}", url, e));
                    break;
                }
            }
        }

        let failure = state.diagnostic();
        let diagnostic_path = failure
            .as_deref()
            .and_then(|line| self.write_diagnostic(category, line));

        let phase = state.phase();
        let total_pages = state.total_pages();
        let pages_harvested = state.cursor();
        let summaries = state.into_summaries();
        let summary_path = self.persist(category, &summaries);

        CategoryOutcome {
            category,
            phase,
            total_pages,
            pages_harvested,
            summaries,
            failure,
            summary_path,
            diagnostic_path,
        }
    }

    fn write_diagnostic(&self, category: Category, line: &str) -> Option<PathBuf> {
        tracing::error!("{}", line);
        let path = self.layout.failure_path(category);
        match append_diagnostic(&path, line) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::error!("Could not write diagnostic {}: {}", path.display(), e);
                None
            }
        }
    }

    fn persist(&self, category: Category, summaries: &[SummaryRecord]) -> Option<PathBuf> {
        if summaries.is_empty() {
            tracing::warn!("{}: no projects listed, nothing to save", category);
            return None;
        }

        let path = self.layout.summary_path(category);
        match write_records(&path, summaries) {
            Ok(()) => {
                tracing::info!(
                    "Saved {} summary records to {}",
                    summaries.len(),
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                tracing::error!("Could not save {}: {}", path.display(), e);
                None
            }
        }
    }
}
