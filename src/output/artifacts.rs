//! Artifact naming
//!
//! Every file the harvester writes is named from the run date and the
//! category, so no two categories ever write the same file:
//!
//! | Artifact | File name |
//! |----------|-----------|
//! | Summary table | `<YYYY_MM_DD>-<category>-1.csv` |
//! | Detail table | `<YYYY_MM_DD>-<category>-2.csv` |
//! | Failure diagnostic | `<category>_failed.txt` |
//! | Consolidated table | `[CES]_Projects_Full_List-<YYYY_MM_DD>.csv` |

use crate::state::Category;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

const SUMMARY_SUFFIX: &str = "-1.csv";
const DETAIL_SUFFIX: &str = "-2.csv";
const CONSOLIDATED_PREFIX: &str = "[CES]_Projects_Full_List-";

/// Builds artifact paths inside one output directory for one run date
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    directory: PathBuf,
    date: NaiveDate,
}

impl ArtifactLayout {
    pub fn new(directory: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            directory: directory.into(),
            date,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date stamp used in file names
    pub fn stamp(&self) -> String {
        self.date.format("%Y_%m_%d").to_string()
    }

    pub fn summary_path(&self, category: Category) -> PathBuf {
        self.directory
            .join(format!("{}-{}{}", self.stamp(), category, SUMMARY_SUFFIX))
    }

    pub fn detail_path(&self, category: Category) -> PathBuf {
        self.directory
            .join(format!("{}-{}{}", self.stamp(), category, DETAIL_SUFFIX))
    }

    pub fn failure_path(&self, category: Category) -> PathBuf {
        self.directory.join(format!("{}_failed.txt", category))
    }

    pub fn consolidated_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}{}.csv", CONSOLIDATED_PREFIX, self.stamp()))
    }
}

/// Artifacts written for one category during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryArtifacts {
    pub category: Category,
    pub summary: Option<PathBuf>,
    pub detail: Option<PathBuf>,
    pub diagnostic: Option<PathBuf>,
}

impl CategoryArtifacts {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            summary: None,
            detail: None,
            diagnostic: None,
        }
    }

    /// Intermediate tables to delete once consolidation succeeded
    pub fn intermediates(&self) -> impl Iterator<Item = &PathBuf> {
        self.summary.iter().chain(self.detail.iter())
    }
}

/// Which intermediate table an artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Summary,
    Detail,
}

/// Parses an intermediate artifact name into its date, category and kind
///
/// Only names of the exact form `<YYYY_MM_DD>-<category>-{1,2}.csv` with a
/// valid date and a known category are artifacts; anything else returns None.
pub fn parse_artifact_name(file_name: &str) -> Option<(NaiveDate, Category, ArtifactKind)> {
    let (rest, kind) = if let Some(rest) = file_name.strip_suffix(SUMMARY_SUFFIX) {
        (rest, ArtifactKind::Summary)
    } else if let Some(rest) = file_name.strip_suffix(DETAIL_SUFFIX) {
        (rest, ArtifactKind::Detail)
    } else {
        return None;
    };

    let (stamp, category) = rest.split_once('-')?;
    let date = NaiveDate::parse_from_str(stamp, "%Y_%m_%d").ok()?;
    let category = Category::from_id(category)?;
    Some((date, category, kind))
}

/// Parses the status tag out of a detail artifact name
///
/// `2024_05_01-pre-certificacion-2.csv` yields `pre-certificacion`. Names that
/// are not detail artifacts return None.
pub fn parse_detail_status(file_name: &str) -> Option<String> {
    match parse_artifact_name(file_name)? {
        (_, category, ArtifactKind::Detail) => Some(category.as_str().to_string()),
        _ => None,
    }
}

/// Returns true if a file name is a summary artifact
pub fn is_summary_artifact(file_name: &str) -> bool {
    matches!(parse_artifact_name(file_name), Some((_, _, ArtifactKind::Summary)))
}

/// Returns true if a file name is a detail artifact
pub fn is_detail_artifact(file_name: &str) -> bool {
    matches!(parse_artifact_name(file_name), Some((_, _, ArtifactKind::Detail)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ArtifactLayout {
        ArtifactLayout::new("/data/raw", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[test]
    fn test_artifact_names() {
        let layout = layout();
        assert_eq!(
            layout.summary_path(Category::EnProceso),
            PathBuf::from("/data/raw/2024_05_01-en-proceso-1.csv")
        );
        assert_eq!(
            layout.detail_path(Category::SelloPlus),
            PathBuf::from("/data/raw/2024_05_01-sello-plus-2.csv")
        );
        assert_eq!(
            layout.failure_path(Category::Certificacion),
            PathBuf::from("/data/raw/certificacion_failed.txt")
        );
        assert_eq!(
            layout.consolidated_path(),
            PathBuf::from("/data/raw/[CES]_Projects_Full_List-2024_05_01.csv")
        );
    }

    #[test]
    fn test_parse_detail_status() {
        assert_eq!(
            parse_detail_status("2024_05_01-pre-certificacion-2.csv").as_deref(),
            Some("pre-certificacion")
        );
        assert_eq!(
            parse_detail_status("2024_05_01-certificacion-2.csv").as_deref(),
            Some("certificacion")
        );
        assert_eq!(parse_detail_status("2024_05_01-certificacion-1.csv"), None);
        assert_eq!(parse_detail_status("2024_05_01--2.csv"), None);
        assert_eq!(parse_detail_status("notes.txt"), None);
        assert_eq!(parse_detail_status("budget-2.csv"), None);
        assert_eq!(parse_detail_status("2024_05_01-unknown-2.csv"), None);
        assert_eq!(parse_detail_status("2024_13_01-certificacion-2.csv"), None);
    }

    #[test]
    fn test_parse_artifact_name() {
        assert_eq!(
            parse_artifact_name("2024_05_01-sello-plus-1.csv"),
            Some((
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                Category::SelloPlus,
                ArtifactKind::Summary
            ))
        );
        assert_eq!(parse_artifact_name("team-roster-1.csv"), None);
        assert_eq!(parse_artifact_name("2024_05_01-en-proceso-3.csv"), None);
    }

    #[test]
    fn test_status_roundtrips_for_every_category() {
        let layout = layout();
        for category in Category::all() {
            let path = layout.detail_path(category);
            let name = path.file_name().unwrap().to_str().unwrap();
            assert_eq!(parse_detail_status(name).as_deref(), Some(category.as_str()));
        }
    }

    #[test]
    fn test_artifact_kinds() {
        assert!(is_summary_artifact("2024_05_01-en-proceso-1.csv"));
        assert!(is_detail_artifact("2024_05_01-en-proceso-2.csv"));
        assert!(!is_detail_artifact("[CES]_Projects_Full_List-2024_05_01.csv"));
        assert!(!is_summary_artifact("en-proceso_failed.txt"));
        assert!(!is_summary_artifact("team-roster-1.csv"));
        assert!(!is_detail_artifact("notes-2.csv"));
    }

    #[test]
    fn test_intermediates() {
        let mut artifacts = CategoryArtifacts::new(Category::EnProceso);
        artifacts.summary = Some(PathBuf::from("a-1.csv"));
        artifacts.diagnostic = Some(PathBuf::from("x_failed.txt"));
        assert_eq!(artifacts.intermediates().count(), 1);
    }
}
