//! Report outputs for post-analysis results
//!
//! - **CSV**: incorrect-forecast exports and long-form metric tables
//! - **JSON**: figure specs for an external renderer
//! - **Plot**: the figure descriptions and the [`plot::PlotBackend`] seam
//!
//! # Usage
//!
//! ```ignore
//! use sepval::report;
//!
//! // Picks the format from the extension
//! report::generate("summary/groups.csv", &rows)?;
//! report::generate("summary/groups.json", &rows)?;
//! ```

pub mod csv;
pub mod json;
pub mod plot;

use crate::error::Result;
use crate::longform::LongFormRow;
use crate::outcome::{Outcome, OutcomeSet};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Write long-form rows as JSON (`.json`) or CSV (anything else)
pub fn generate<P: AsRef<Path>>(path: P, rows: &[LongFormRow]) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut buf = Vec::new();
    match ext.as_str() {
        "json" => serde_json::to_writer_pretty(&mut buf, rows)?,
        _ => csv::write(&mut buf, rows)?,
    }
    csv::write_file(path, &buf)
}

/// `path` with `ext` appended. Figure paths carry no extension and energy
/// channel keys contain dots, so `Path::with_extension` would cut them short.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Outcome counts for one classified table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub hits: usize,
    pub correct_negatives: usize,
    pub false_alarms: usize,
    pub misses: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_outcomes(set: &OutcomeSet) -> Self {
        let mut summary = Self {
            skipped: set.skipped,
            ..Self::default()
        };

        for outcome in Outcome::ALL {
            let n = set.get(outcome).len();
            match outcome {
                Outcome::Hit => summary.hits += n,
                Outcome::CorrectNegative => summary.correct_negatives += n,
                Outcome::FalseAlarm => summary.false_alarms += n,
                Outcome::Miss => summary.misses += n,
            }
        }
        summary.total = set.classified() + set.skipped;
        summary
    }

    /// Add another summary's counts into this one
    pub fn merge(&mut self, other: &Summary) {
        self.total += other.total;
        self.hits += other.hits;
        self.correct_negatives += other.correct_negatives;
        self.false_alarms += other.false_alarms;
        self.misses += other.misses;
        self.skipped += other.skipped;
    }
}
