//! Post-analysis pipelines
//!
//! Two entry points sit on top of the building blocks:
//!
//! - [`export_incorrect`]: classify one selections table, write its false
//!   alarms and misses as CSV, and optionally hand an outcome figure to a
//!   [`PlotBackend`]. [`discover`] and [`export_batch`] do the same for
//!   every selections table under a directory.
//! - [`read_in_metrics`] + [`box_plot_report`]: load a metrics table, filter
//!   models, and emit one box plot per energy channel, threshold and metric
//!   group. A failing group is recorded and the rest carry on.

use crate::catalog;
use crate::error::{Error, Result};
use crate::filter::{ModelFilter, MODEL_COLUMN};
use crate::longform::{self, AssembleOptions};
use crate::outcome::{self, Outcome, OutcomeColumns, OutcomeSet, Partition};
use crate::profile::{self, FluxSeries, ENERGY_KEY_COLUMN, THRESHOLD_KEY_COLUMN};
use crate::quantity::Quantity;
use crate::report::csv::{self as csv_report, counterpart_dir, SOURCE_DIR};
use crate::report::plot::{BoxPlot, OutcomePlot, PlotBackend, Series};
use crate::report::{self, append_extension, Summary};
use crate::store;
use crate::table::{parse_timestamp, Table};
use chrono::NaiveDateTime;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const WINDOW_START_COLUMN: &str = "Prediction Window Start";
pub const MISMATCH_COLUMN: &str = "Mismatch Allowed";
pub const PREDICTION_ENERGY_KEY_COLUMN: &str = "Prediction Energy Channel Key";
pub const PREDICTION_THRESHOLD_KEY_COLUMN: &str = "Prediction Threshold Key";
pub const METRICS_ENERGY_COLUMN: &str = "Energy Channel";
pub const METRICS_THRESHOLD_COLUMN: &str = "Threshold";

/// Name of the directory holding the validation run's results
pub const OUTPUT_DIR: &str = "output";

const OBSERVED_FLUX_LABEL: &str = "Observed Flux";

// ============================================================================
// INCORRECT FORECAST EXPORT
// ============================================================================

/// Which kind of selections table is being exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportKind {
    /// Boolean all clear forecasts
    AllClear,
    /// Numeric max flux in the prediction window against a threshold
    MaxFluxInPredictionWindow,
}

impl ExportKind {
    pub const ALL: [ExportKind; 2] = [ExportKind::AllClear, ExportKind::MaxFluxInPredictionWindow];

    pub fn quantity(self) -> Quantity {
        match self {
            ExportKind::AllClear => Quantity::AllClear,
            ExportKind::MaxFluxInPredictionWindow => Quantity::MaxFluxInPredictionWindow,
        }
    }

    /// File name prefix of this kind's selections tables
    pub fn selections_prefix(self) -> String {
        format!("{}_selections_", self.quantity().file_prefix())
    }

    /// Kind of a selections table, judged by its file name
    pub fn for_file(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|kind| name.starts_with(&kind.selections_prefix()))
    }

    /// Leading word(s) of figure titles
    pub fn title_label(self) -> &'static str {
        match self {
            ExportKind::AllClear => "All Clear",
            ExportKind::MaxFluxInPredictionWindow => "Max Flux",
        }
    }

    fn figure_suffix(self) -> &'static str {
        match self {
            ExportKind::AllClear => "incorrect",
            ExportKind::MaxFluxInPredictionWindow => "Outcomes",
        }
    }

    fn classify(self, table: &Table, threshold: f64) -> Result<OutcomeSet> {
        match self {
            ExportKind::AllClear => {
                outcome::classify_boolean(table, OutcomeColumns::all_clear(table)?, threshold)
            }
            ExportKind::MaxFluxInPredictionWindow => {
                outcome::classify_continuous(table, OutcomeColumns::max_flux(table)?, threshold)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRequest {
    pub kind: ExportKind,
    pub threshold: f64,
    /// Hand an outcome figure to the plot backend
    pub plot: bool,
}

/// What one export did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportSummary {
    pub source: PathBuf,
    pub counts: Summary,
    /// CSV files written, false alarms first
    pub written: Vec<PathBuf>,
    /// Figure path passed to the backend, if any
    pub figure: Option<PathBuf>,
}

/// Export the incorrect forecasts of one selections table.
///
/// Empty buckets are reported on stdout and produce no file. An empty table
/// produces nothing at all.
pub fn export_incorrect(path: &Path, request: ExportRequest, backend: &dyn PlotBackend) -> Result<ExportSummary> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = store::read_table(path)?;

    let mut summary = ExportSummary {
        source: path.to_path_buf(),
        ..ExportSummary::default()
    };
    if table.is_empty() {
        println!("{name}: Dataframe empty");
        return Ok(summary);
    }

    let set = request.kind.classify(&table, request.threshold)?;
    summary.counts = Summary::from_outcomes(&set);

    for outcome in Outcome::ALL {
        if set.get(outcome).is_empty() {
            println!("{name}: {}", outcome.empty_message());
        }
    }
    if set.skipped > 0 {
        warn!(table = %name, skipped = set.skipped, "rows without an observed or predicted value were not classified");
    }

    for (outcome, partition) in set.exportable() {
        let written = csv_report::write_partition(path, outcome, partition)?;
        info!("Wrote {} {}", partition.len(), written.display());
        summary.written.push(written);
    }

    if request.plot {
        let figure = outcome_figure(path, &table, &set, request)?;
        backend.outcome_plot(&figure)?;
        summary.figure = Some(figure.path);
    }

    Ok(summary)
}

/// Build the outcome figure for a classified table
pub fn outcome_figure(path: &Path, table: &Table, set: &OutcomeSet, request: ExportRequest) -> Result<OutcomePlot> {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("table");
    let energy_key = first_text(table, ENERGY_KEY_COLUMN)?;
    let threshold_key = first_text(table, THRESHOLD_KEY_COLUMN)?;

    let observed = match profile::read_observed_fluxes(output_dir(path), &energy_key, &threshold_key) {
        Ok(series) => series,
        Err(e) => {
            warn!(error = %e, "observed fluxes unavailable, plotting forecasts only");
            FluxSeries::default()
        }
    };

    let mut series = vec![Series {
        label: OBSERVED_FLUX_LABEL.to_string(),
        dates: observed.dates,
        values: observed.fluxes,
    }];
    for outcome in Outcome::ALL {
        let partition = set.get(outcome);
        series.push(Series {
            label: outcome.label().to_string(),
            dates: window_starts(partition)?,
            values: partition.levels.clone(),
        });
    }

    Ok(OutcomePlot {
        title: outcome_title(table, request.kind)?,
        threshold: request.threshold,
        x_label: "Date".to_string(),
        y_label: String::new(),
        series,
        path: counterpart_dir(path, "plots").join(format!("{stem}_{}", request.kind.figure_suffix())),
    })
}

/// `"<label> <model> (<ek>, <tk>)"`, naming both the observed and predicted
/// channels when the table was scored with mismatches allowed.
pub fn outcome_title(table: &Table, kind: ExportKind) -> Result<String> {
    let model = first_text(table, MODEL_COLUMN)?;
    let energy_key = first_text(table, ENERGY_KEY_COLUMN)?;
    let threshold_key = first_text(table, THRESHOLD_KEY_COLUMN)?;
    let label = kind.title_label();

    let mismatch = table
        .column(MISMATCH_COLUMN)
        .and_then(|c| table.get(0, c).as_bool())
        .unwrap_or(false);

    if mismatch {
        let pred_energy = first_text(table, PREDICTION_ENERGY_KEY_COLUMN)?;
        let pred_threshold = first_text(table, PREDICTION_THRESHOLD_KEY_COLUMN)?;
        Ok(format!(
            "{label} {model} (Observations: {energy_key}, {threshold_key} and Predictions: {pred_energy}, {pred_threshold})"
        ))
    } else {
        Ok(format!("{label} {model} ({energy_key}, {threshold_key})"))
    }
}

fn first_text(table: &Table, column: &str) -> Result<String> {
    let id = table.require(column)?;
    if table.is_empty() {
        return Ok(String::new());
    }
    Ok(table.text(0, id).unwrap_or_default())
}

fn window_starts(partition: &Partition) -> Result<Vec<NaiveDateTime>> {
    if partition.is_empty() {
        return Ok(Vec::new());
    }
    let rows = &partition.rows;
    let id = rows.require(WINDOW_START_COLUMN)?;
    (0..rows.len())
        .map(|row| match rows.text(row, id) {
            Some(ts) => parse_timestamp(&ts),
            None => Err(Error::InvalidValue {
                column: WINDOW_START_COLUMN.to_string(),
                row,
                value: String::new(),
            }),
        })
        .collect()
}

/// The `output` directory a selections table belongs to: the nearest
/// ancestor named `output`, else the folder above its `pkl`/`csv` folder.
pub fn output_dir(source: &Path) -> PathBuf {
    if let Some(dir) = source
        .ancestors()
        .skip(1)
        .find(|a| a.file_name().and_then(|n| n.to_str()) == Some(OUTPUT_DIR))
    {
        return dir.to_path_buf();
    }
    let parent = source.parent().unwrap_or_else(|| Path::new(""));
    match parent.file_name().and_then(|n| n.to_str()) {
        Some(SOURCE_DIR) | Some("csv") => parent.parent().unwrap_or(parent).to_path_buf(),
        _ => parent.to_path_buf(),
    }
}

// ============================================================================
// DIRECTORY EXPORT
// ============================================================================

/// Result of exporting one file in a batch
#[derive(Debug)]
pub struct FileExport {
    pub path: PathBuf,
    pub kind: ExportKind,
    pub result: Result<ExportSummary>,
}

/// Every selections table under `root`, sorted by path.
///
/// Files that are themselves exports are ignored. A table present in both
/// the `pkl` and the `csv` tree is taken from `pkl` only.
pub fn discover(root: &Path) -> Vec<(PathBuf, ExportKind)> {
    let mut found: Vec<(PathBuf, ExportKind)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "csv" | "json"))
                .unwrap_or(false)
        })
        .filter(|e| !is_export(e.path()))
        .filter_map(|e| ExportKind::for_file(e.path()).map(|kind| (e.path().to_path_buf(), kind)))
        .collect();

    // pkl sorts first within each table so duplicates drop the csv copy
    found.sort_by_key(|(path, _)| (dedupe_key(path), !in_source_dir(path), path.clone()));
    found.dedup_by_key(|(path, _)| dedupe_key(path));
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

fn is_export(path: &Path) -> bool {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    [Outcome::FalseAlarm, Outcome::Miss]
        .into_iter()
        .any(|o| stem.ends_with(&format!("_{}", csv_report::suffix(o))))
}

fn in_source_dir(path: &Path) -> bool {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        == Some(SOURCE_DIR)
}

fn dedupe_key(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    counterpart_dir(path, "csv").join(stem)
}

/// Export many tables in parallel. Each file stands alone: a failure is
/// recorded in its [`FileExport`] and the others still run.
pub fn export_batch(
    files: &[(PathBuf, ExportKind)],
    threshold: f64,
    plot: bool,
    backend: &dyn PlotBackend,
    progress: Option<&ProgressBar>,
) -> Vec<FileExport> {
    files
        .par_iter()
        .map(|(path, kind)| {
            let request = ExportRequest {
                kind: *kind,
                threshold,
                plot,
            };
            let result = export_incorrect(path, request, backend);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "export failed");
            }
            if let Some(pb) = progress {
                pb.inc(1);
                pb.set_message(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
            FileExport {
                path: path.clone(),
                kind: *kind,
                result,
            }
        })
        .collect()
}

// ============================================================================
// GROUPED METRICS REPORT
// ============================================================================

/// Read the metrics table for `quantity` from `<output_root>/output` and
/// apply the model filter.
pub fn read_in_metrics(output_root: &Path, quantity: Quantity, filter: &ModelFilter) -> Result<Table> {
    let stem = format!("{}_metrics", quantity.file_prefix());
    let path = store::locate_table(output_root.join(OUTPUT_DIR), &stem)?;
    info!("Reading in {}", path.display());
    let table = store::read_table(&path)?;
    filter.apply(&table)
}

#[derive(Debug, Clone, Copy)]
pub struct BoxReportOptions<'a> {
    /// Label models "Model <i>" unless a highlight is given
    pub anonymous: bool,
    /// Model name fragment to single out; empty for none
    pub highlight: &'a str,
    pub percent_metrics: &'a [String],
    /// Directory receiving figures and their long-form tables
    pub summary_dir: &'a Path,
}

/// One metric group that could not be reported
#[derive(Debug)]
pub struct GroupFailure {
    pub energy_channel: String,
    pub threshold: String,
    /// 1-based group number
    pub group: usize,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BoxReport {
    pub figures: Vec<PathBuf>,
    pub tables: Vec<PathBuf>,
    pub failures: Vec<GroupFailure>,
}

impl BoxReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Box plots for every energy channel, threshold and metric group of a
/// metrics table.
///
/// Unknown layouts and a table without energy channel or threshold columns
/// fail the whole request. Anything going wrong inside one group is recorded
/// in [`BoxReport::failures`].
pub fn box_plot_report(
    table: &Table,
    quantity: Quantity,
    options: &BoxReportOptions<'_>,
    backend: &dyn PlotBackend,
) -> Result<BoxReport> {
    let groups = catalog::groups_for(quantity)?;
    let mut report = BoxReport::default();
    if groups.is_empty() {
        debug!("{} has no metric groups", quantity);
        return Ok(report);
    }

    let energy_col = table.require(METRICS_ENERGY_COLUMN)?;
    let threshold_col = table.require(METRICS_THRESHOLD_COLUMN)?;

    for energy_channel in table.unique(energy_col) {
        let channel = table.filter_eq(&[(energy_col, energy_channel.as_str())]);
        for threshold in channel.unique(threshold_col) {
            info!("{}, {}", energy_channel, threshold);
            let sub = channel.filter_eq(&[(threshold_col, threshold.as_str())]);

            for (i, group) in groups.iter().enumerate() {
                let n = i + 1;
                let name = box_figure_name(quantity, &energy_channel, &threshold, n, options);
                let path = options.summary_dir.join(name);
                let title = format!("{} Group {} ({}, {})", quantity, n, energy_channel, threshold);

                match render_group(&sub, group, title, path, options, backend) {
                    Ok(Some((figure, csv))) => {
                        report.figures.push(figure);
                        report.tables.push(csv);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        warn!(energy_channel = %energy_channel, threshold = %threshold, group = n, error = %error, "metric group failed");
                        report.failures.push(GroupFailure {
                            energy_channel: energy_channel.clone(),
                            threshold: threshold.clone(),
                            group: n,
                            error,
                        });
                    }
                }
            }
        }
    }
    Ok(report)
}

/// `<Quantity>_<ek>_<tk>_boxes_Group<n>[_<highlight>][_anon]`
pub fn box_figure_name(
    quantity: Quantity,
    energy_channel: &str,
    threshold: &str,
    group: usize,
    options: &BoxReportOptions<'_>,
) -> String {
    let mut name = format!("{quantity}_{energy_channel}_{threshold}_boxes_Group{group}");
    if !options.highlight.is_empty() {
        name.push('_');
        name.push_str(options.highlight);
    }
    if options.anonymous {
        name.push_str("_anon");
    }
    name
}

fn render_group(
    sub: &Table,
    group: &[&str],
    title: String,
    path: PathBuf,
    options: &BoxReportOptions<'_>,
    backend: &dyn PlotBackend,
) -> Result<Option<(PathBuf, PathBuf)>> {
    let assemble = AssembleOptions {
        anonymize: options.anonymous,
        highlight: options.highlight,
        percent_metrics: options.percent_metrics,
    };
    let rows = longform::assemble(sub, group, &assemble)?;
    if rows.is_empty() && !options.highlight.is_empty() {
        debug!("{} not present in {}", options.highlight, title);
        return Ok(None);
    }

    let csv = append_extension(&path, "csv");
    report::generate(&csv, &rows)?;

    let plot = BoxPlot {
        title,
        metrics: group.iter().map(|m| m.to_string()).collect(),
        highlight: options.highlight.to_string(),
        x_label: "Metric".to_string(),
        y_label: "Value".to_string(),
        rows,
        path,
    };
    if let Err(e) = backend.box_plot(&plot) {
        // A failed group leaves no table behind
        if let Err(rm) = std::fs::remove_file(&csv) {
            warn!(path = %csv.display(), error = %rm, "could not remove table of failed group");
        }
        return Err(e);
    }
    Ok(Some((plot.path, csv)))
}
