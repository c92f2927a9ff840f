//! Per-category harvest progress
//!
//! A category moves through `Start → FetchingPage(n) → Accumulating(n)` once per
//! listing page, then ends in either `Done` or `Failed`.

use crate::records::{dedup_records, SummaryRecord};
use crate::state::Category;
use std::fmt;

/// Phase of a category harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestPhase {
    /// Page count not yet known
    Start,

    /// Listing page `n` (1-based) is being fetched
    FetchingPage(u32),

    /// Records of listing page `n` have been appended
    Accumulating(u32),

    /// Every listing page was processed
    Done,

    /// Harvest stopped early; see [`HarvestFailure`]
    Failed,
}

impl HarvestPhase {
    /// Returns true once no further page will be fetched
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for HarvestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::FetchingPage(n) => write!(f, "fetching page {}", n),
            Self::Accumulating(n) => write!(f, "accumulating page {}", n),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Diagnostic recorded when a category stops early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestFailure {
    /// Page that was being processed when the error occurred
    pub page_reached: u32,

    /// Page count discovered for the category
    pub total_pages: u32,

    /// Error description
    pub message: String,
}

/// Accumulated state of one category's summary harvest
#[derive(Debug, Clone)]
pub struct HarvestState {
    category: Category,
    phase: HarvestPhase,
    total_pages: u32,
    /// Last page whose records were fully appended (0 = none)
    cursor: u32,
    summaries: Vec<SummaryRecord>,
    failure: Option<HarvestFailure>,
}

impl HarvestState {
    /// Creates an empty state for a category
    pub fn new(category: Category) -> Self {
        Self {
            category,
            phase: HarvestPhase::Start,
            total_pages: 0,
            cursor: 0,
            summaries: Vec::new(),
            failure: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn phase(&self) -> HarvestPhase {
        self.phase
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn failure(&self) -> Option<&HarvestFailure> {
        self.failure.as_ref()
    }

    pub fn summaries(&self) -> &[SummaryRecord] {
        &self.summaries
    }

    /// Records the discovered page count
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
    }

    /// Returns the next page to fetch and enters `FetchingPage`, or enters
    /// `Done` when every page has been accumulated
    pub fn next_page(&mut self) -> Option<u32> {
        if self.phase.is_terminal() {
            return None;
        }

        let next = self.cursor + 1;
        if next > self.total_pages {
            self.phase = HarvestPhase::Done;
            return None;
        }

        self.phase = HarvestPhase::FetchingPage(next);
        Some(next)
    }

    /// Appends the records of the page currently being fetched
    pub fn accumulate(&mut self, records: Vec<SummaryRecord>) {
        if let HarvestPhase::FetchingPage(page) = self.phase {
            self.summaries.extend(records);
            self.cursor = page;
            self.phase = HarvestPhase::Accumulating(page);
        } else {
            tracing::warn!(
                "Ignoring {} records for {} in phase {}",
                records.len(),
                self.category,
                self.phase
            );
        }
    }

    /// Stops the harvest and records where it stopped
    pub fn fail(&mut self, message: impl Into<String>) {
        let page_reached = match self.phase {
            HarvestPhase::FetchingPage(n) | HarvestPhase::Accumulating(n) => n,
            _ => self.cursor,
        };

        self.failure = Some(HarvestFailure {
            page_reached,
            total_pages: self.total_pages,
            message: message.into(),
        });
        self.phase = HarvestPhase::Failed;
    }

    /// Consumes the state and returns the deduplicated summaries
    pub fn into_summaries(self) -> Vec<SummaryRecord> {
        dedup_records(self.summaries)
    }

    /// Formats the failure diagnostic written next to the artifacts
    pub fn diagnostic(&self) -> Option<String> {
        self.failure.as_ref().map(|failure| {
            format!(
                "Category {}: the process stopped at page {} out of {}. Error: {}",
                self.category, failure.page_reached, failure.total_pages, failure.message
            )
        })
    }
}
