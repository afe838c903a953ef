//! Observed flux time profiles
//!
//! Outcome figures draw the observed flux behind the forecasts. The
//! validation run records, per matched forecast, which observed time profile
//! files covered its prediction window ("Observed Time Profile", comma
//! separated). Profiles are plain text, one sample per line:
//!
//! ```text
//! # 2017-09-10 SEP event, >10 MeV
//! 2017-09-10 16:00:00  0.52
//! 2017-09-10T16:05:00Z 1.37
//! ```

use crate::error::Result;
use crate::store;
use crate::table::{parse_timestamp, Value};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::warn;

pub const SPHINX_TABLE: &str = "SPHINX_dataframe";
pub const OBSERVED_PROFILE_COLUMN: &str = "Observed Time Profile";
pub const ENERGY_KEY_COLUMN: &str = "Energy Channel Key";
pub const THRESHOLD_KEY_COLUMN: &str = "Threshold Key";

/// Samples of one or more concatenated profiles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxSeries {
    pub dates: Vec<NaiveDateTime>,
    pub fluxes: Vec<f64>,
}

impl FluxSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    fn extend(&mut self, other: FluxSeries) {
        self.dates.extend(other.dates);
        self.fluxes.extend(other.fluxes);
    }
}

/// Read one time profile. An unreadable file gives an empty series.
pub fn read_time_profile<P: AsRef<Path>>(path: P) -> FluxSeries {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => parse_time_profile(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read time profile");
            FluxSeries::default()
        }
    }
}

/// Parse profile text, skipping comments, blank lines and malformed samples.
pub fn parse_time_profile(text: &str) -> FluxSeries {
    let mut series = FluxSeries::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let parsed = match tokens.as_slice() {
            [ts, flux, ..] if ts.contains('T') => sample(ts, flux),
            [date, time, flux, ..] => sample(&format!("{date} {time}"), flux),
            _ => None,
        };
        if let Some((date, flux)) = parsed {
            series.dates.push(date);
            series.fluxes.push(flux);
        }
    }
    series
}

fn sample(ts: &str, flux: &str) -> Option<(NaiveDateTime, f64)> {
    let date = parse_timestamp(ts).ok()?;
    let flux = flux.parse::<f64>().ok()?;
    Some((date, flux))
}

/// All observed fluxes for an energy channel and threshold, gathered from
/// the profiles listed in the SPHINX dataframe under `output_dir`.
pub fn read_observed_fluxes<P: AsRef<Path>>(output_dir: P, energy_key: &str, threshold_key: &str) -> Result<FluxSeries> {
    let table = store::read_table(store::locate_table(output_dir, SPHINX_TABLE)?)?;
    let energy = table.require(ENERGY_KEY_COLUMN)?;
    let threshold = table.require(THRESHOLD_KEY_COLUMN)?;
    let profiles = table.require(OBSERVED_PROFILE_COLUMN)?;

    let matching = table.filter_eq(&[(energy, energy_key), (threshold, threshold_key)]);

    let mut files: Vec<String> = Vec::new();
    for row in matching.rows() {
        if let Value::Text(cell) = &row[profiles.index()] {
            for name in cell.trim().split(',').map(str::trim).filter(|s| !s.is_empty()) {
                if !files.iter().any(|f| f == name) {
                    files.push(name.to_string());
                }
            }
        }
    }

    let mut series = FluxSeries::default();
    for file in &files {
        series.extend(read_time_profile(file));
    }
    Ok(series)
}
