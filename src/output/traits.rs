//! Output traits and types
//!
//! This module defines the row interface shared by every table the harvester
//! writes, plus the in-memory table used when artifacts are read back.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed artifact {path}: {message}")]
    MalformedArtifact { path: String, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A record that flattens to one table row
///
/// `to_row` must return exactly one value per header, so every table written
/// from a `TableRow` type is rectangular.
pub trait TableRow {
    /// Column names, in order
    fn headers() -> Vec<&'static str>;

    /// Cell values, in column order; missing values are empty cells
    fn to_row(&self) -> Vec<String>;
}

/// A rectangular table of string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given columns
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from typed records
    pub fn from_records<R: TableRow>(records: &[R]) -> Self {
        let mut table = Self::new(&R::headers());
        table.rows = records.iter().map(TableRow::to_row).collect();
        table
    }

    /// Returns the index of a column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewrites the rows onto another column layout, matching columns by name
    ///
    /// Columns missing from this table become empty cells; columns not listed
    /// in `columns` are dropped.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Vec<Vec<String>> {
        let indices: Vec<Option<usize>> = columns
            .iter()
            .map(|column| self.column(column.as_ref()))
            .collect();

        self.rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|index| {
                        index
                            .and_then(|i| row.get(i))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}
