//! JSON figure specs
//!
//! Writes each figure as a self-contained JSON document at the figure path
//! plus `.json`, for an external renderer.

use crate::error::Result;
use crate::report::csv::write_file;
use crate::report::append_extension;
use crate::report::plot::{BoxPlot, OutcomePlot, PlotBackend};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Figure<'a> {
    Outcomes(&'a OutcomePlot),
    Boxes(&'a BoxPlot),
}

/// Write an outcome figure spec
pub fn write_outcomes<W: Write>(writer: W, plot: &OutcomePlot) -> Result<()> {
    serde_json::to_writer_pretty(writer, &Figure::Outcomes(plot))?;
    Ok(())
}

/// Write a box plot figure spec
pub fn write_boxes<W: Write>(writer: W, plot: &BoxPlot) -> Result<()> {
    serde_json::to_writer_pretty(writer, &Figure::Boxes(plot))?;
    Ok(())
}

/// [`PlotBackend`] that stores figure specs as JSON files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFigures;

impl JsonFigures {
    pub fn spec_path(figure: &Path) -> PathBuf {
        append_extension(figure, "json")
    }
}

impl PlotBackend for JsonFigures {
    fn outcome_plot(&self, plot: &OutcomePlot) -> Result<()> {
        let mut buf = Vec::new();
        write_outcomes(&mut buf, plot)?;
        let path = Self::spec_path(&plot.path);
        write_file(&path, &buf)?;
        info!("Wrote figure spec {}", path.display());
        Ok(())
    }

    fn box_plot(&self, plot: &BoxPlot) -> Result<()> {
        let mut buf = Vec::new();
        write_boxes(&mut buf, plot)?;
        let path = Self::spec_path(&plot.path);
        write_file(&path, &buf)?;
        info!("Wrote figure spec {}", path.display());
        Ok(())
    }
}
