//! sepval - post-analysis of solar energetic particle forecast validation
//!
//! A validation run scores SEP forecast models against observations and
//! leaves behind results tables: per-forecast "selections" and per-model
//! "metrics". This crate slices those tables after the fact.
//!
//! # Overview
//!
//! - **Incorrect forecasts**: split a selections table into hits, correct
//!   negatives, false alarms and misses, export the incorrect ones as CSV
//!   and describe an outcome-over-time figure.
//! - **Grouped metrics**: filter a metrics table by model, flatten each
//!   metric group into long form and describe one box plot per energy
//!   channel, threshold and group.
//!
//! Rendering is left to a [`PlotBackend`]; the bundled [`JsonFigures`]
//! backend stores each figure as a JSON spec.
//!
//! # Quick Start
//!
//! ```no_run
//! use sepval::{export_incorrect, ExportKind, ExportRequest, NoPlots};
//! use std::path::Path;
//!
//! let request = ExportRequest {
//!     kind: ExportKind::AllClear,
//!     threshold: 10.0,
//!     plot: false,
//! };
//! let path = Path::new("output/pkl/all_clear_selections_MAG4_min.10.0.max.-1.0.units.MeV_threshold_10.0.json");
//! let summary = export_incorrect(path, request, &NoPlots)?;
//! println!("{} false alarms, {} misses", summary.counts.false_alarms, summary.counts.misses);
//! # Ok::<(), sepval::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`quantity`]: forecasted quantities and their file prefixes
//! - [`table`], [`store`]: in-memory tables and the results store
//! - [`resolve`]: locating the predicted value column
//! - [`outcome`]: contingency classification
//! - [`filter`]: model include/exclude
//! - [`catalog`], [`longform`]: metric groups and their long-form rows
//! - [`profile`]: observed flux time profiles
//! - [`report`]: CSV and JSON outputs, figure descriptions
//! - [`analysis`]: the end-to-end pipelines

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod longform;
pub mod outcome;
pub mod profile;
pub mod quantity;
pub mod report;
pub mod resolve;
pub mod store;
pub mod table;

pub use analysis::{
    box_plot_report, export_incorrect, read_in_metrics, BoxReport, BoxReportOptions, ExportKind, ExportRequest,
    ExportSummary, GroupFailure,
};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{Include, ModelFilter};
pub use outcome::{Outcome, OutcomeSet};
pub use quantity::Quantity;
pub use report::json::JsonFigures;
pub use report::plot::{NoPlots, PlotBackend};
pub use table::{Table, Value};
