//! Predicted value column resolution
//!
//! Selections tables for flux quantities name their predicted column after
//! the quantity, e.g. "Predicted SEP Peak Intensity (Onset Peak)" or
//! "Predicted SEP Peak Intensity Max (Max Flux)", alongside a companion
//! "... Units" column. The column is resolved once per table; the result is
//! a [`ColumnId`] that the classifier uses directly.

use crate::error::{Error, Result};
use crate::table::{ColumnId, Table};
use tracing::debug;

/// Known predicted-value column families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictedColumn {
    PeakIntensity,
}

impl PredictedColumn {
    /// Fragment every column of this family contains
    pub fn pattern(self) -> &'static str {
        match self {
            PredictedColumn::PeakIntensity => "Predicted SEP Peak Intensity",
        }
    }
}

/// Find the single column containing the hint's pattern, ignoring units
/// columns. Zero or several candidates are both errors.
pub fn resolve(table: &Table, hint: PredictedColumn) -> Result<ColumnId> {
    let pattern = hint.pattern();
    let candidates: Vec<&String> = table
        .columns()
        .iter()
        .filter(|c| !c.contains("Units") && c.contains(pattern))
        .collect();

    match candidates.as_slice() {
        [] => Err(Error::NoMatchingColumn {
            hint: pattern.to_string(),
        }),
        [one] => {
            debug!(column = %one, "resolved predicted column");
            table.require(one)
        }
        many => Err(Error::AmbiguousColumn {
            hint: pattern.to_string(),
            candidates: many.iter().map(|c| c.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(columns: &[&str]) -> Table {
        Table::from_rows(columns, vec![])
    }

    #[test]
    fn test_resolves_onset_peak_column() {
        let t = header(&[
            "Model",
            "Observed Max Flux in Prediction Window",
            "Predicted SEP Peak Intensity (Onset Peak)",
            "Predicted SEP Peak Intensity (Onset Peak) Units",
        ]);
        let id = resolve(&t, PredictedColumn::PeakIntensity).unwrap();
        assert_eq!(t.column_name(id), "Predicted SEP Peak Intensity (Onset Peak)");
    }

    #[test]
    fn test_resolves_max_flux_column() {
        let t = header(&[
            "Predicted SEP Peak Intensity Max (Max Flux) Units",
            "Predicted SEP Peak Intensity Max (Max Flux)",
        ]);
        let id = resolve(&t, PredictedColumn::PeakIntensity).unwrap();
        assert_eq!(id.index(), 1);
    }

    #[test]
    fn test_no_candidate() {
        let t = header(&["Model", "Predicted SEP Peak Intensity Units"]);
        let err = resolve(&t, PredictedColumn::PeakIntensity).unwrap_err();
        assert!(matches!(err, Error::NoMatchingColumn { .. }));
    }

    #[test]
    fn test_ambiguous_does_not_pick_first() {
        let t = header(&[
            "Predicted SEP Peak Intensity (Onset Peak)",
            "Predicted SEP Peak Intensity Max (Max Flux)",
        ]);
        match resolve(&t, PredictedColumn::PeakIntensity) {
            Err(Error::AmbiguousColumn { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }
}
