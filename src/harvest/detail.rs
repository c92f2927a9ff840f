//! Detail harvester
//!
//! Fetches every project page of a category with bounded parallelism. Results
//! are drained by a single loop, so no collection is shared between tasks.
//! A project page that cannot be fetched is dropped and the batch goes on.

use crate::harvest::extractor::extract_detail;
use crate::harvest::{FetchError, Fetcher};
use crate::output::{write_records, OutputResult, TableRow};
use crate::records::{DetailRecord, SummaryRecord};
use crate::state::Category;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::Path;

/// Records and failures of one detail batch
#[derive(Debug, Clone, Default)]
pub struct DetailOutcome {
    /// Deduplicated records, in listing order
    pub records: Vec<DetailRecord>,

    /// Project pages that were dropped
    pub failures: Vec<FetchError>,
}

impl DetailOutcome {
    /// Writes the records as the category's detail table
    pub fn persist(&self, path: &Path) -> OutputResult<()> {
        write_records(path, &self.records)?;
        tracing::info!(
            "Saved {} detail records to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}

/// Fetches and extracts project pages
pub struct DetailHarvester<'a> {
    fetcher: &'a Fetcher,
    concurrency: usize,
    progress_every: usize,
}

impl<'a> DetailHarvester<'a> {
    pub fn new(fetcher: &'a Fetcher, concurrency: usize, progress_every: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            progress_every: progress_every.max(1),
        }
    }

    /// Harvests the detail page of every summary
    ///
    /// The result does not depend on completion order: records are put back
    /// in listing order and rows that render identically are kept once.
    pub async fn harvest(&self, category: Category, summaries: &[SummaryRecord]) -> DetailOutcome {
        let total = summaries.len();
        tracing::info!(
            "{}: fetching {} project pages ({} at a time)",
            category,
            total,
            self.concurrency
        );

        let fetcher = self.fetcher;
        let mut results = stream::iter(summaries.iter().enumerate())
            .map(|(index, summary)| async move {
                let url = summary.detail_url.as_str();
                let result = fetcher
                    .fetch(url)
                    .await
                    .map(|body| extract_detail(url, &body));
                (index, result)
            })
            .buffer_unordered(self.concurrency);

        let mut collected = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut completed = 0;

        while let Some((index, result)) = results.next().await {
            completed += 1;
            match result {
                Ok(record) => {
                    tracing::debug!(
                        "Extracted {:?} from {}",
                        record.name.as_deref().unwrap_or(""),
                        record.detail_url
                    );
                    collected.push((index, record));
                }
                Err(e) => {
                    tracing::error!("Dropping project page: {}", e);
                    failures.push(e);
                }
            }

            if completed % self.progress_every == 0 || completed == total {
                tracing::info!(
                    "{}: {}/{} project pages processed",
                    category,
                    completed,
                    total
                );
            }
        }

        collected.sort_by_key(|(index, _)| *index);
        let mut seen = HashSet::with_capacity(collected.len());
        let records: Vec<DetailRecord> = collected
            .into_iter()
            .map(|(_, record)| record)
            .filter(|record| seen.insert(record.to_row()))
            .collect();

        if !failures.is_empty() {
            tracing::warn!(
                "{}: {} of {} project pages dropped",
                category,
                failures.len(),
                total
            );
        }

        DetailOutcome { records, failures }
    }
}
