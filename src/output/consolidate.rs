//! Consolidation of per-category detail tables
//!
//! The consolidator merges the detail artifacts named in a
//! [`ConsolidationPlan`] into one status-tagged, deduplicated table and then
//! deletes the intermediate artifacts listed in the plan, and only those.

use crate::output::artifacts::{
    is_detail_artifact, is_summary_artifact, parse_detail_status, CategoryArtifacts,
};
use crate::output::csv_table::{read_table, write_table};
use crate::output::traits::{OutputResult, Table};
use crate::records::{dedup_records, normalize_cell, DETAIL_COLUMNS};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Column injected in front of the detail columns
pub const STATUS_COLUMN: &str = "status";

/// Column layout of the consolidated table
pub fn consolidated_columns() -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(DETAIL_COLUMNS.len() + 1);
    columns.push(STATUS_COLUMN);
    columns.extend_from_slice(&DETAIL_COLUMNS);
    columns
}

/// What to merge and what to delete afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationPlan {
    /// Detail tables to merge; the status tag is parsed from each file name
    pub detail_artifacts: Vec<PathBuf>,

    /// Intermediate files to delete once the consolidated table is written
    pub purge: Vec<PathBuf>,
}

impl ConsolidationPlan {
    /// Builds a plan from the artifacts a run wrote
    pub fn from_artifacts(artifacts: &[CategoryArtifacts]) -> Self {
        Self {
            detail_artifacts: artifacts.iter().filter_map(|a| a.detail.clone()).collect(),
            purge: artifacts
                .iter()
                .flat_map(|a| a.intermediates().cloned())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detail_artifacts.is_empty()
    }
}

/// Builds a plan from the intermediate artifacts found in a directory
///
/// Used when consolidating the output of earlier runs; a normal run passes the
/// exact artifacts it wrote instead.
pub fn scan_artifacts(directory: &Path) -> OutputResult<ConsolidationPlan> {
    let mut plan = ConsolidationPlan::default();
    if !directory.exists() {
        tracing::warn!("Directory {} does not exist", directory.display());
        return Ok(plan);
    }

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if is_detail_artifact(name) {
            plan.detail_artifacts.push(path.clone());
            plan.purge.push(path);
        } else if is_summary_artifact(name) {
            plan.purge.push(path);
        }
    }

    plan.detail_artifacts.sort();
    plan.purge.sort();
    Ok(plan)
}

/// Outcome of a successful consolidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationOutcome {
    /// The consolidated table
    pub path: PathBuf,

    /// Rows written after deduplication
    pub rows: usize,

    /// Detail artifacts that were merged
    pub sources: usize,

    /// Intermediate files that were deleted
    pub purged: Vec<PathBuf>,
}

/// Merges detail artifacts into the final table
#[derive(Debug, Clone)]
pub struct Consolidator {
    output_path: PathBuf,
}

impl Consolidator {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads, tags, and deduplicates detail artifacts
    ///
    /// Returns the merged table and the artifacts that contributed. Artifacts
    /// whose name carries no status or that cannot be read are logged and
    /// skipped.
    pub fn merge(&self, detail_artifacts: &[PathBuf]) -> (Table, Vec<PathBuf>) {
        let columns = consolidated_columns();
        let mut merged = Table::new(&columns);
        let mut sources = Vec::new();

        for path in detail_artifacts {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let Some(status) = parse_detail_status(file_name) else {
                tracing::error!("Cannot read a status from artifact name {}", path.display());
                continue;
            };

            let table = match read_table(path) {
                Ok(table) => table,
                Err(e) => {
                    tracing::error!("Error reading {}: {}", path.display(), e);
                    continue;
                }
            };

            let unknown: Vec<&String> = table
                .headers
                .iter()
                .filter(|h| !DETAIL_COLUMNS.contains(&h.as_str()))
                .collect();
            if !unknown.is_empty() {
                tracing::warn!("Ignoring unknown columns {:?} in {}", unknown, file_name);
            }

            let rows = table.project(&DETAIL_COLUMNS);
            tracing::info!(
                "Loaded {} with status '{}' ({} rows)",
                file_name,
                status,
                rows.len()
            );

            merged.rows.extend(rows.into_iter().map(|row| {
                let mut tagged = Vec::with_capacity(columns.len());
                tagged.push(status.clone());
                tagged.extend(row.iter().map(|value| normalize_cell(value)));
                tagged
            }));
            sources.push(path.clone());
        }

        merged.rows = dedup_records(merged.rows);
        (merged, sources)
    }

    /// Writes the consolidated table and purges the plan's intermediates
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - The table was written and intermediates deleted
    /// * `Ok(None)` - Nothing to consolidate; nothing was written or deleted
    /// * `Err(OutputError)` - The consolidated table could not be written;
    ///   intermediates are left in place
    pub fn consolidate(&self, plan: &ConsolidationPlan) -> OutputResult<Option<ConsolidationOutcome>> {
        if plan.is_empty() {
            tracing::warn!("No detail tables found to consolidate");
            return Ok(None);
        }

        tracing::info!("Found {} files to consolidate", plan.detail_artifacts.len());
        let (table, sources) = self.merge(&plan.detail_artifacts);

        if table.is_empty() {
            tracing::warn!("Consolidated table is empty; keeping intermediate files");
            return Ok(None);
        }

        write_table(&self.output_path, &table)?;
        tracing::info!(
            "Saved consolidated data to {} ({} rows)",
            self.output_path.display(),
            table.len()
        );

        // Detail tables that were skipped stay on disk
        let skipped: Vec<&PathBuf> = plan
            .detail_artifacts
            .iter()
            .filter(|path| !sources.contains(path))
            .collect();
        let purge: Vec<PathBuf> = plan
            .purge
            .iter()
            .filter(|path| !skipped.contains(path))
            .cloned()
            .collect();
        let purged = self.purge(&purge);

        Ok(Some(ConsolidationOutcome {
            path: self.output_path.clone(),
            rows: table.len(),
            sources: sources.len(),
            purged,
        }))
    }

    fn purge(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        tracing::info!("Cleaning up intermediate files...");
        let mut purged = Vec::new();

        for path in paths {
            if path == &self.output_path {
                continue;
            }

            match fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!("Deleted temporary file: {}", path.display());
                    purged.push(path.clone());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("Temporary file already gone: {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("Could not delete temporary file {}: {}", path.display(), e);
                }
            }
        }

        purged
    }
}
