//! Failure diagnostics
//!
//! When a category stops early, one line describing where it stopped is
//! appended to that category's diagnostic file. Diagnostics are never purged.

use crate::output::traits::OutputResult;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Appends one diagnostic line to `path`, creating the file if needed
pub fn append_diagnostic(path: &Path, line: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line.trim_end())?;
    Ok(())
}
