//! CSV reading and writing
//!
//! Tables are written as UTF-8 with a leading byte-order mark so spreadsheet
//! tools detect the encoding. Files are written to a temporary sibling and
//! renamed into place, so an interrupted run never leaves a truncated table.

use crate::output::traits::{OutputError, OutputResult, Table, TableRow};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes typed records as a CSV table
pub fn write_records<R: TableRow>(path: &Path, records: &[R]) -> OutputResult<()> {
    write_table(path, &Table::from_records(records))
}

/// Writes a table to `path`, replacing any previous file
pub fn write_table(path: &Path, table: &Table) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging = staging_path(path);
    {
        let mut file = BufWriter::new(File::create(&staging)?);
        file.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }

    fs::rename(&staging, path)?;
    Ok(())
}

/// Reads a CSV table, skipping a leading byte-order mark
pub fn read_table(path: &Path) -> OutputResult<Table> {
    let bytes = fs::read(path)?;
    let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(OutputError::MalformedArtifact {
            path: path.display().to_string(),
            message: "missing header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table { headers, rows })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
