//! Figure descriptions handed to a plotting backend
//!
//! Everything a figure needs is computed up front: series, labels, title
//! and output path. A [`PlotBackend`] only renders.

use crate::error::Result;
use crate::longform::LongFormRow;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// One labelled time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub dates: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

/// Forecast outcomes over time, drawn over the observed flux
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomePlot {
    pub title: String,
    pub threshold: f64,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Output path without extension; the backend picks the format
    pub path: PathBuf,
}

/// Box plot of one metric group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub title: String,
    pub metrics: Vec<String>,
    pub highlight: String,
    pub x_label: String,
    pub y_label: String,
    pub rows: Vec<LongFormRow>,
    /// Output path without extension
    pub path: PathBuf,
}

pub trait PlotBackend: Sync {
    fn outcome_plot(&self, plot: &OutcomePlot) -> Result<()>;
    fn box_plot(&self, plot: &BoxPlot) -> Result<()>;
}

/// Backend that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlots;

impl PlotBackend for NoPlots {
    fn outcome_plot(&self, _plot: &OutcomePlot) -> Result<()> {
        Ok(())
    }

    fn box_plot(&self, _plot: &BoxPlot) -> Result<()> {
        Ok(())
    }
}
