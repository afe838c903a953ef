//! In-memory results table
//!
//! Results tables are heterogeneous: the set of columns depends on the
//! forecasted quantity (selections tables carry one of several predicted
//! value columns, metrics tables carry one column per metric). A [`Table`]
//! keeps ordered column names and loosely typed cells; typed access goes
//! through a [`ColumnId`] resolved once against the header.
//!
//! Tables are never mutated after loading. Every filtering operation returns
//! a new table that keeps the source column layout and relative row order.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Infer a cell from its text form (CSV input).
    ///
    /// Empty strings and NaN spellings are missing values; `True`/`False` in
    /// any case are booleans; anything that parses as a float is a number.
    pub fn infer(raw: &str) -> Value {
        let s = raw.trim();
        if s.is_empty() || matches!(s, "NaN" | "nan" | "NAN" | "None" | "NaT") {
            return Value::Null;
        }
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_nan() => Value::Null,
            Ok(v) => Value::Number(v),
            Err(_) => Value::Text(s.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Number(v)
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Position of a column within a specific table's header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(usize);

impl ColumnId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from a header and rows. Rows are padded with nulls or
    /// truncated to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience constructor for literal headers
    pub fn from_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    /// An empty table sharing this table's header
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<ColumnId> {
        self.columns.iter().position(|c| c == name).map(ColumnId)
    }

    /// Like [`Table::column`] but a missing column is an error.
    pub fn require(&self, name: &str) -> Result<ColumnId> {
        self.column(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
        })
    }

    pub fn column_name(&self, id: ColumnId) -> &str {
        &self.columns[id.0]
    }

    pub fn row(&self, row: usize) -> &[Value] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, id: ColumnId) -> &Value {
        &self.rows[row][id.0]
    }

    /// New table holding the given rows, in the order given
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// New table holding the rows for which `keep` returns true
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[Value]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rows whose text cells equal the given values, one per column
    pub fn filter_eq(&self, conditions: &[(ColumnId, &str)]) -> Table {
        self.filter(|row| {
            conditions
                .iter()
                .all(|(id, want)| row[id.0].to_string() == *want)
        })
    }

    /// Distinct non-null values of a column as text, in first-seen order
    pub fn unique(&self, id: ColumnId) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut ordered = Vec::new();
        for row in &self.rows {
            let cell = &row[id.0];
            if cell.is_null() {
                continue;
            }
            let text = cell.to_string();
            if seen.insert(text.clone()) {
                ordered.push(text);
            }
        }
        ordered
    }

    /// Text form of a cell, `None` for nulls
    pub fn text(&self, row: usize, id: ColumnId) -> Option<String> {
        let cell = self.get(row, id);
        (!cell.is_null()).then(|| cell.to_string())
    }

    /// Numeric view of a column. Nulls become NaN; any other non-number is an
    /// error naming the offending row.
    pub fn numbers(&self, id: ColumnId) -> Result<Vec<f64>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match &row[id.0] {
                Value::Null => Ok(f64::NAN),
                Value::Number(v) => Ok(*v),
                other => Err(Error::InvalidValue {
                    column: self.columns[id.0].clone(),
                    row: i,
                    value: other.to_string(),
                }),
            })
            .collect()
    }
}

/// Parse a prediction window or time profile timestamp.
///
/// Accepts RFC 3339 (`2017-09-10T16:00:00Z`), ISO without zone
/// (`2017-09-10T16:00:00`) and space separated (`2017-09-10 16:00:00`),
/// with optional fractional seconds.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    let s = s.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Err(Error::InvalidTimestamp {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["Model", "Energy Channel", "Hit Rate"],
            vec![
                vec!["SAWS-ASPECS".into(), "min.10.0.max.-1.0.units.MeV".into(), 0.5.into()],
                vec!["UMASEP-10".into(), "min.10.0.max.-1.0.units.MeV".into(), Value::Null],
                vec!["SAWS-ASPECS".into(), "min.100.0.max.-1.0.units.MeV".into(), 0.75.into()],
            ],
        )
    }

    // ==========================================================================
    // CELL INFERENCE TESTS
    // ==========================================================================

    #[test]
    fn test_infer_missing_spellings() {
        for raw in ["", "  ", "NaN", "nan", "None"] {
            assert_eq!(Value::infer(raw), Value::Null, "{raw:?} should be null");
        }
    }

    #[test]
    fn test_infer_booleans_any_case() {
        assert_eq!(Value::infer("True"), Value::Bool(true));
        assert_eq!(Value::infer("FALSE"), Value::Bool(false));
    }

    #[test]
    fn test_infer_numbers_and_text() {
        assert_eq!(Value::infer("10"), Value::Number(10.0));
        assert_eq!(Value::infer("1e-3"), Value::Number(0.001));
        assert_eq!(
            Value::infer("2017-09-10 16:00:00"),
            Value::Text("2017-09-10 16:00:00".to_string())
        );
    }

    #[test]
    fn test_infer_trims_text() {
        assert_eq!(Value::infer(" MAG4 "), Value::Text("MAG4".to_string()));
    }

    #[test]
    fn test_display_round_trips_integers() {
        assert_eq!(Value::Number(12.0).to_string(), "12");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Null.to_string(), "");
    }

    // ==========================================================================
    // TABLE ACCESS TESTS
    // ==========================================================================

    #[test]
    fn test_short_rows_are_padded() {
        let t = Table::from_rows(&["a", "b"], vec![vec![1.0.into()]]);
        assert_eq!(t.row(0), &[Value::Number(1.0), Value::Null]);
    }

    #[test]
    fn test_require_missing_column() {
        let err = sample().require("Brier Score").unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column } if column == "Brier Score"));
    }

    #[test]
    fn test_unique_is_first_seen_order() {
        let t = sample();
        let id = t.require("Model").unwrap();
        assert_eq!(t.unique(id), vec!["SAWS-ASPECS", "UMASEP-10"]);
    }

    #[test]
    fn test_unique_many_repeats() {
        let rows = (0..1000).map(|i| vec![Value::from(format!("m{}", i % 7).as_str())]).collect();
        let t = Table::from_rows(&["Model"], rows);
        let id = t.require("Model").unwrap();
        assert_eq!(t.unique(id), (0..7).map(|i| format!("m{i}")).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_eq_keeps_order() {
        let t = sample();
        let model = t.require("Model").unwrap();
        let sub = t.filter_eq(&[(model, "SAWS-ASPECS")]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.columns(), t.columns());
        assert_eq!(sub.get(1, t.require("Hit Rate").unwrap()), &Value::Number(0.75));
    }

    #[test]
    fn test_numbers_maps_null_to_nan() {
        let t = sample();
        let vals = t.numbers(t.require("Hit Rate").unwrap()).unwrap();
        assert_eq!(vals[0], 0.5);
        assert!(vals[1].is_nan());
    }

    #[test]
    fn test_numbers_rejects_text() {
        let t = sample();
        let err = t.numbers(t.require("Model").unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { row: 0, .. }));
    }

    // ==========================================================================
    // TIMESTAMP TESTS
    // ==========================================================================

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDateTime::parse_from_str("2017-09-10 16:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2017-09-10T16:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2017-09-10T16:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2017-09-10 16:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2017-09-10 16:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
