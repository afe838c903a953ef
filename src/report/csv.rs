//! CSV exports
//!
//! Incorrect forecasts are written next to the table they came from: a
//! table at `output/pkl/<name>.<ext>` exports to
//! `output/csv/<name>_false_alarms.csv` and `output/csv/<name>_misses.csv`.

use crate::error::{Error, Result};
use crate::longform::LongFormRow;
use crate::outcome::{Outcome, Partition};
use crate::store;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Directory holding the source tables, as written by the validation run
pub const SOURCE_DIR: &str = "pkl";

/// Directory `dir_name` that sits beside the source table's `pkl` folder.
/// Tables outside a `pkl` folder keep their own directory.
pub fn counterpart_dir(source: &Path, dir_name: &str) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    match parent.file_name().and_then(|n| n.to_str()) {
        Some(SOURCE_DIR) => parent.with_file_name(dir_name),
        _ => parent.to_path_buf(),
    }
}

/// File stem suffix for an outcome bucket
pub fn suffix(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Hit => "hits",
        Outcome::CorrectNegative => "correct_negatives",
        Outcome::FalseAlarm => "false_alarms",
        Outcome::Miss => "misses",
    }
}

/// Export path for one outcome bucket of `source`
pub fn export_path(source: &Path, outcome: Outcome) -> PathBuf {
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("table");
    counterpart_dir(source, "csv").join(format!("{stem}_{}.csv", suffix(outcome)))
}

/// Write a bucket's rows as CSV and return the file written.
///
/// The CSV is rendered in memory first so a failure leaves no partial file.
pub fn write_partition(source: &Path, outcome: Outcome, partition: &Partition) -> Result<PathBuf> {
    let path = export_path(source, outcome);
    let mut buf = Vec::new();
    store::write_csv(&mut buf, &partition.rows)?;
    write_file(&path, &buf)?;
    Ok(path)
}

/// Write long-form rows with the header `Metrics,Models,Values`.
pub fn write<W: Write>(writer: W, rows: &[LongFormRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    if rows.is_empty() {
        wtr.write_record(["Metrics", "Models", "Values"])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}
