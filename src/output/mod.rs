//! Output module for harvest artifacts
//!
//! This module handles:
//! - Naming the per-category and consolidated artifacts
//! - Writing and reading CSV tables
//! - Appending failure diagnostics
//! - Consolidating detail tables into the final table
//! - Printing the run report

mod artifacts;
pub mod consolidate;
mod csv_table;
mod diagnostics;
pub mod report;
mod traits;

pub use artifacts::{
    is_detail_artifact, is_summary_artifact, parse_artifact_name, parse_detail_status,
    ArtifactKind, ArtifactLayout, CategoryArtifacts,
};
pub use consolidate::{
    consolidated_columns, scan_artifacts, ConsolidationOutcome, ConsolidationPlan, Consolidator,
    STATUS_COLUMN,
};
pub use csv_table::{read_table, write_records, write_table, UTF8_BOM};
pub use diagnostics::append_diagnostic;
pub use report::{print_report, CategoryReport, RunReport};
pub use traits::{OutputError, OutputResult, Table, TableRow};
