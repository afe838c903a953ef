//! Error types for post-analysis
//!
//! Configuration errors (unknown quantity, unresolvable column) are fatal for
//! the current request. Data errors carry the column and row at fault so the
//! message can point at the offending table cell.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{name}' is not a valid forecasted quantity; choose one of: {valid}")]
    UnknownQuantity { name: String, valid: String },

    #[error("no metric group layout is defined for quantity '{quantity}'")]
    NoMetricGroups { quantity: String },

    #[error("no column matches '{hint}'")]
    NoMatchingColumn { hint: String },

    #[error("column hint '{hint}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousColumn { hint: String, candidates: Vec<String> },

    #[error("table has no column named '{column}'")]
    MissingColumn { column: String },

    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("cannot parse timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("unsupported table format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("no results table found (searched: {})", searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    TableNotFound { searched: Vec<PathBuf> },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors that indicate a mismatch between the request and the
    /// table schema rather than bad data or I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::UnknownQuantity { .. }
                | Error::NoMetricGroups { .. }
                | Error::NoMatchingColumn { .. }
                | Error::AmbiguousColumn { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_column_lists_candidates() {
        let err = Error::AmbiguousColumn {
            hint: "Predicted SEP Peak Intensity".to_string(),
            candidates: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "column hint 'Predicted SEP Peak Intensity' is ambiguous, candidates: A, B"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "output/pkl/all_clear_metrics.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().starts_with("output/pkl/all_clear_metrics.csv"));
        assert!(!err.is_configuration());
    }
}
