//! Persisted results store
//!
//! The validation run writes every results table twice, under
//! `output/pkl/` and `output/csv/`. This module reads the CSV form and a
//! records-oriented JSON form, picking the reader from the file extension,
//! and writes tables back out as CSV.

use crate::error::{Error, Result};
use crate::table::{Table, Value};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a results table, choosing the format from the file extension.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    let table = match ext.as_str() {
        "csv" => read_csv(reader)?,
        "json" => read_json(reader)?,
        _ => {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };
    debug!(path = %path.display(), rows = table.len(), "loaded results table");
    Ok(table)
}

/// Read CSV with a header row. A leading unnamed column (a written-out row
/// index) is dropped.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let skip_index = headers.first().is_some_and(|h| h.is_empty());
    let columns: Vec<String> = headers.into_iter().skip(usize::from(skip_index)).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .skip(usize::from(skip_index))
                .map(Value::infer)
                .collect(),
        );
    }
    Ok(Table::new(columns, rows))
}

/// Read a JSON array of records. Column order follows first appearance.
pub fn read_json<R: Read>(reader: R) -> Result<Table> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_reader(reader)?;

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(json_cell).unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(Table::new(columns, rows))
}

fn json_cell(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => n.as_f64().map(Value::from).unwrap_or(Value::Null),
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Write a table as CSV (header plus one record per row).
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Find `<stem>` under an `output/` directory, trying the `pkl` tree before
/// the `csv` tree and JSON before CSV inside `pkl`.
pub fn locate_table<P: AsRef<Path>>(output_dir: P, stem: &str) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    let candidates = [
        output_dir.join("pkl").join(format!("{stem}.json")),
        output_dir.join("pkl").join(format!("{stem}.csv")),
        output_dir.join("csv").join(format!("{stem}.csv")),
        output_dir.join("csv").join(format!("{stem}.json")),
    ];
    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or_else(|| Error::TableNotFound {
            searched: candidates.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_drops_index_column() {
        let data = ",Model,Observed SEP All Clear\n0,SAWS-ASPECS,True\n1,UMASEP-10,\n";
        let t = read_csv(data.as_bytes()).unwrap();
        assert_eq!(t.columns(), &["Model", "Observed SEP All Clear"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(0)[1], Value::Bool(true));
        assert_eq!(t.row(1)[1], Value::Null);
    }

    #[test]
    fn test_read_csv_keeps_named_first_column() {
        let data = "Model,Hit Rate\nA,0.5\n";
        let t = read_csv(data.as_bytes()).unwrap();
        assert_eq!(t.columns(), &["Model", "Hit Rate"]);
        assert_eq!(t.row(0)[1], Value::Number(0.5));
    }

    #[test]
    fn test_read_json_records() {
        let data = r#"[
            {"Model": "A", "Hit Rate": 0.5},
            {"Model": "B", "Hit Rate": null, "N (Total Number of Forecasts)": 12}
        ]"#;
        let t = read_json(data.as_bytes()).unwrap();
        assert_eq!(t.columns(), &["Model", "Hit Rate", "N (Total Number of Forecasts)"]);
        assert_eq!(t.row(0)[2], Value::Null);
        assert_eq!(t.row(1)[2], Value::Number(12.0));
    }

    #[test]
    fn test_write_csv_round_trip() {
        let t = Table::from_rows(
            &["Model", "Predicted SEP All Clear", "Hit Rate"],
            vec![vec!["Model+X(1)".into(), false.into(), Value::Null]],
        );
        let mut out = Vec::new();
        write_csv(&mut out, &t).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Model,Predicted SEP All Clear,Hit Rate\nModel+X(1),False,\n");
        assert_eq!(read_csv(text.as_bytes()).unwrap(), t);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_clear_metrics.pkl");
        std::fs::write(&path, b"\x80\x04").unwrap();
        assert!(matches!(read_table(&path), Err(Error::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_table("/nonexistent/all_clear_metrics.csv").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_locate_prefers_pkl_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkl")).unwrap();
        std::fs::create_dir_all(dir.path().join("csv")).unwrap();
        std::fs::write(dir.path().join("csv/fluence_metrics.csv"), "Model\n").unwrap();
        assert_eq!(
            locate_table(dir.path(), "fluence_metrics").unwrap(),
            dir.path().join("csv/fluence_metrics.csv")
        );

        std::fs::write(dir.path().join("pkl/fluence_metrics.json"), "[]").unwrap();
        assert_eq!(
            locate_table(dir.path(), "fluence_metrics").unwrap(),
            dir.path().join("pkl/fluence_metrics.json")
        );
    }

    #[test]
    fn test_locate_reports_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        match locate_table(dir.path(), "awt_metrics") {
            Err(Error::TableNotFound { searched }) => assert_eq!(searched.len(), 4),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
