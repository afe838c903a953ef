//! Forecast outcome classification
//!
//! Splits a selections table into the four cells of the 2x2 contingency
//! table. Two comparison semantics share the same [`OutcomeSet`] result.
//!
//! # Boolean mode (All Clear)
//!
//! An all clear forecast says "no event expected", so `true` is the negative
//! class:
//!
//! ```text
//! Observed | Predicted | Outcome
//! ---------|-----------|-----------------
//! false    | false     | Hit
//! true     | true      | Correct negative
//! true     | false     | False alarm
//! false    | true      | Miss
//! ```
//!
//! # Continuous mode (flux vs threshold)
//!
//! A value crosses the threshold when it is `>=` the threshold:
//!
//! ```text
//! Observed | Predicted | Outcome
//! ---------|-----------|-----------------
//! >= t     | >= t      | Hit
//! <  t     | <  t      | Correct negative
//! <  t     | >= t      | False alarm
//! >= t     | <  t      | Miss
//! ```
//!
//! Rows missing either value land in no bucket and are counted in
//! [`OutcomeSet::skipped`]. Classification does no I/O; persisting the
//! false alarm and miss subsets is up to the caller.

use crate::error::{Error, Result};
use crate::resolve::{self, PredictedColumn};
use crate::table::{ColumnId, Table, Value};
use serde::Serialize;
use std::fmt;

pub const OBSERVED_ALL_CLEAR: &str = "Observed SEP All Clear";
pub const PREDICTED_ALL_CLEAR: &str = "Predicted SEP All Clear";
pub const OBSERVED_MAX_FLUX: &str = "Observed Max Flux in Prediction Window";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Hit,
    CorrectNegative,
    FalseAlarm,
    Miss,
}

impl Outcome {
    /// Display order used for figure legends
    pub const ALL: [Outcome; 4] = [
        Outcome::Hit,
        Outcome::CorrectNegative,
        Outcome::FalseAlarm,
        Outcome::Miss,
    ];

    pub fn from_flags(observed: bool, predicted: bool) -> Outcome {
        match (observed, predicted) {
            (false, false) => Outcome::Hit,
            (true, true) => Outcome::CorrectNegative,
            (true, false) => Outcome::FalseAlarm,
            (false, true) => Outcome::Miss,
        }
    }

    pub fn from_values(observed: f64, predicted: f64, threshold: f64) -> Outcome {
        match (observed >= threshold, predicted >= threshold) {
            (true, true) => Outcome::Hit,
            (false, false) => Outcome::CorrectNegative,
            (false, true) => Outcome::FalseAlarm,
            (true, false) => Outcome::Miss,
        }
    }

    /// Legend label
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Hit => "Hits",
            Outcome::CorrectNegative => "Correct Negatives",
            Outcome::FalseAlarm => "False Alarms",
            Outcome::Miss => "Misses",
        }
    }

    /// Y position for boolean outcomes on a shared flux axis. Purely visual:
    /// false alarms sit above the threshold line, misses below.
    pub fn plot_level(self, threshold: f64) -> f64 {
        match self {
            Outcome::Hit | Outcome::CorrectNegative => threshold,
            Outcome::FalseAlarm => threshold + 2.0,
            Outcome::Miss => threshold - 2.0,
        }
    }

    /// Diagnostic printed when the bucket comes out empty
    pub fn empty_message(self) -> &'static str {
        match self {
            Outcome::Hit => "No hits identified.",
            Outcome::CorrectNegative => "No correct negatives identified.",
            Outcome::FalseAlarm => "No false alarms identified.",
            Outcome::Miss => "No misses identified.",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Observed and predicted columns of a selections table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeColumns {
    pub observed: ColumnId,
    pub predicted: ColumnId,
}

impl OutcomeColumns {
    /// All clear flag columns
    pub fn all_clear(table: &Table) -> Result<Self> {
        Ok(Self {
            observed: table.require(OBSERVED_ALL_CLEAR)?,
            predicted: table.require(PREDICTED_ALL_CLEAR)?,
        })
    }

    /// Observed max flux in the prediction window against whichever peak
    /// intensity column the table carries
    pub fn max_flux(table: &Table) -> Result<Self> {
        Ok(Self {
            observed: table.require(OBSERVED_MAX_FLUX)?,
            predicted: resolve::resolve(table, PredictedColumn::PeakIntensity)?,
        })
    }
}

/// One outcome bucket: the matching rows plus a y value per row for plotting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub rows: Table,
    pub levels: Vec<f64>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeSet {
    pub hit: Partition,
    pub correct_negative: Partition,
    pub false_alarm: Partition,
    pub miss: Partition,
    /// Rows excluded because the observed or predicted value was missing
    pub skipped: usize,
}

impl OutcomeSet {
    pub fn get(&self, outcome: Outcome) -> &Partition {
        match outcome {
            Outcome::Hit => &self.hit,
            Outcome::CorrectNegative => &self.correct_negative,
            Outcome::FalseAlarm => &self.false_alarm,
            Outcome::Miss => &self.miss,
        }
    }

    /// Number of rows placed in a bucket
    pub fn classified(&self) -> usize {
        Outcome::ALL.iter().map(|&o| self.get(o).len()).sum()
    }

    /// Non-empty buckets the caller should persist (false alarms, misses)
    pub fn exportable(&self) -> impl Iterator<Item = (Outcome, &Partition)> {
        [Outcome::FalseAlarm, Outcome::Miss]
            .into_iter()
            .map(move |o| (o, self.get(o)))
            .filter(|(_, p)| !p.is_empty())
    }
}

/// Classify all clear forecasts. `threshold` only sets the plot levels.
pub fn classify_boolean(table: &Table, columns: OutcomeColumns, threshold: f64) -> Result<OutcomeSet> {
    partition(table, |row| {
        let observed = flag(table, row, columns.observed)?;
        let predicted = flag(table, row, columns.predicted)?;
        Ok(observed.zip(predicted).map(|(o, p)| {
            let outcome = Outcome::from_flags(o, p);
            (outcome, outcome.plot_level(threshold))
        }))
    })
}

/// Classify numeric forecasts against a threshold. Plot levels are the
/// predicted values.
pub fn classify_continuous(table: &Table, columns: OutcomeColumns, threshold: f64) -> Result<OutcomeSet> {
    partition(table, |row| {
        let observed = number(table, row, columns.observed)?;
        let predicted = number(table, row, columns.predicted)?;
        Ok(observed
            .zip(predicted)
            .map(|(o, p)| (Outcome::from_values(o, p, threshold), p)))
    })
}

fn partition<F>(table: &Table, mut classify: F) -> Result<OutcomeSet>
where
    F: FnMut(usize) -> Result<Option<(Outcome, f64)>>,
{
    let mut indices: [Vec<usize>; 4] = Default::default();
    let mut levels: [Vec<f64>; 4] = Default::default();
    let mut skipped = 0;

    for row in 0..table.len() {
        match classify(row)? {
            Some((outcome, level)) => {
                let slot = slot(outcome);
                indices[slot].push(row);
                levels[slot].push(level);
            }
            None => skipped += 1,
        }
    }

    let [hit, cn, fa, miss] = indices;
    let [hit_lv, cn_lv, fa_lv, miss_lv] = levels;
    Ok(OutcomeSet {
        hit: Partition { rows: table.select(&hit), levels: hit_lv },
        correct_negative: Partition { rows: table.select(&cn), levels: cn_lv },
        false_alarm: Partition { rows: table.select(&fa), levels: fa_lv },
        miss: Partition { rows: table.select(&miss), levels: miss_lv },
        skipped,
    })
}

fn slot(outcome: Outcome) -> usize {
    match outcome {
        Outcome::Hit => 0,
        Outcome::CorrectNegative => 1,
        Outcome::FalseAlarm => 2,
        Outcome::Miss => 3,
    }
}

fn flag(table: &Table, row: usize, id: ColumnId) -> Result<Option<bool>> {
    match table.get(row, id) {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(invalid(table, row, id, other)),
    }
}

fn number(table: &Table, row: usize, id: ColumnId) -> Result<Option<f64>> {
    match table.get(row, id) {
        Value::Null => Ok(None),
        Value::Number(v) if v.is_nan() => Ok(None),
        Value::Number(v) => Ok(Some(*v)),
        other => Err(invalid(table, row, id, other)),
    }
}

fn invalid(table: &Table, row: usize, id: ColumnId, value: &Value) -> Error {
    Error::InvalidValue {
        column: table.column_name(id).to_string(),
        row,
        value: value.to_string(),
    }
}
