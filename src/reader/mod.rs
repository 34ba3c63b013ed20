//! Shared CSV reading and writing helpers.
//!
//! Every IO failure carries the file path and the dataset label so the
//! analyst can tell which input broke without a stack trace.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ForecastError, Result};

/// Read all rows of a delimited file into typed records.
///
/// The header row must carry every column in `required_columns`; a missing
/// column is reported by name rather than as a row-level parse failure.
/// Fields are trimmed before deserialization. An existing but empty table
/// is an error; inputs to this pipeline are never legitimately empty.
pub fn read_csv_rows<T: DeserializeOwned>(
    path: &Path,
    label: &'static str,
    required_columns: &[&'static str],
) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(ForecastError::MissingInput { label, path: path.to_path_buf() });
    }
    let file = fs::File::open(path).map_err(|source| ForecastError::Io {
        label,
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| ForecastError::Csv {
            label,
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    for column in required_columns {
        if !headers.iter().any(|header| header == *column) {
            return Err(ForecastError::MissingColumn { label, column });
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| ForecastError::Csv {
            label,
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(ForecastError::EmptyTable { label, path: path.to_path_buf() });
    }
    Ok(rows)
}

/// Write records to a delimited file, creating parent directories as needed
pub fn write_csv_rows<T: Serialize>(path: &Path, label: &'static str, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ForecastError::Io {
            label,
            path: path.to_path_buf(),
            source,
        })?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|source| ForecastError::Csv {
        label,
        path: path.to_path_buf(),
        source,
    })?;
    for row in rows {
        writer.serialize(row).map_err(|source| ForecastError::Csv {
            label,
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| ForecastError::Io {
        label,
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        code: String,
        value: Option<f64>,
    }

    #[test]
    fn round_trips_rows_with_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        let rows = vec![
            Row { code: "3361".to_string(), value: Some(12.5) },
            Row { code: "3362".to_string(), value: None },
        ];
        write_csv_rows(&path, "test rows", &rows).unwrap();
        let read: Vec<Row> = read_csv_rows(&path, "test rows", &["code", "value"]).unwrap();
        assert_eq!(read, rows);
    }

    #[test]
    fn missing_file_is_reported_with_label() {
        let err = read_csv_rows::<Row>(Path::new("/nonexistent/rows.csv"), "test rows", &[])
            .unwrap_err();
        assert!(err.to_string().contains("test rows"));
    }

    #[test]
    fn missing_required_column_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "code,other\n3361,1\n").unwrap();
        let err = read_csv_rows::<Row>(&path, "test rows", &["code", "value"]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ForecastError::MissingColumn { label: "test rows", column: "value" }
        ));
    }
}
