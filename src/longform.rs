//! Long-form metric tables for grouped display
//!
//! A metrics table is wide (one column per metric, one row per model). Box
//! plots want it long: one `(metric, model, value)` row per cell of the
//! group's columns. Labels go through three optional transforms: forecast
//! count suffix, anonymization, and highlighting.

use crate::error::Result;
use crate::filter::MODEL_COLUMN;
use crate::table::Table;
use serde::Serialize;

pub const FORECAST_COUNT_COLUMN: &str = "N (Total Number of Forecasts)";

/// Shared label for every non-highlighted model
pub const BUCKET_LABEL: &str = "Models";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongFormRow {
    #[serde(rename = "Metrics")]
    pub metric: String,
    #[serde(rename = "Models")]
    pub model: String,
    #[serde(rename = "Values")]
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssembleOptions<'a> {
    /// Replace model names with "Model <row>" (ignored when highlighting)
    pub anonymize: bool,
    /// Model name fragment to single out; empty for none
    pub highlight: &'a str,
    /// Metrics stored as fractions and displayed as percentages
    pub percent_metrics: &'a [String],
}

/// Flatten `group`'s columns of `table` into long-form rows, column by
/// column, keeping row order within each column.
///
/// Anonymous labels are positional within `table`, so the same model can
/// get different placeholders in differently filtered sub-tables.
pub fn assemble(table: &Table, group: &[&str], options: &AssembleOptions<'_>) -> Result<Vec<LongFormRow>> {
    let model_col = table.require(MODEL_COLUMN)?;
    let count_col = table.column(FORECAST_COUNT_COLUMN);

    let mut out = Vec::new();
    for &metric in group {
        let mut values = table.numbers(table.require(metric)?)?;
        if options.percent_metrics.iter().any(|m| m == metric) {
            for v in &mut values {
                *v *= 100.0;
            }
        }

        let mut labels: Vec<String> = (0..table.len())
            .map(|row| {
                let name = table.text(row, model_col).unwrap_or_default();
                match count_col.and_then(|c| table.text(row, c)) {
                    Some(n) => format!("{name} ({n})"),
                    None => name,
                }
            })
            .collect();

        if options.highlight.is_empty() {
            if options.anonymize {
                for (i, label) in labels.iter_mut().enumerate() {
                    *label = format!("Model {i}");
                }
            }
        } else {
            if !labels.iter().any(|l| l.contains(options.highlight)) {
                continue;
            }
            for label in labels.iter_mut().filter(|l| !l.contains(options.highlight)) {
                *label = BUCKET_LABEL.to_string();
            }
        }

        out.extend(labels.into_iter().zip(values).map(|(model, value)| LongFormRow {
            metric: metric.to_string(),
            model,
            value,
        }));
    }
    Ok(out)
}
