//! CSV export of filtered collections
//!
//! An unquoted header row of labels, then one row per record with every cell
//! wrapped in double quotes. Embedded quotes are not escaped, so a value
//! containing `"` yields a malformed row.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One exported column: header label and value extractor
pub struct FieldSpec<T> {
    pub label: &'static str,
    pub value: fn(&T) -> String,
}

impl<T> FieldSpec<T> {
    pub const fn new(label: &'static str, value: fn(&T) -> String) -> Self {
        Self { label, value }
    }
}

/// Serialize records into CSV text
pub fn to_csv<'a, T: 'a, I>(records: I, fields: &[FieldSpec<T>]) -> String
where
    I: IntoIterator<Item = &'a T>,
{
    let header = fields
        .iter()
        .map(|f| f.label)
        .collect::<Vec<_>>()
        .join(",");

    let mut rows = vec![header];
    for record in records {
        let row = fields
            .iter()
            .map(|f| format!("\"{}\"", (f.value)(record)))
            .collect::<Vec<_>>()
            .join(",");
        rows.push(row);
    }
    rows.join("\n")
}

/// `{resource}_{YYYY-MM-DD}.csv`
pub fn export_filename(resource: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", resource, date.format("%Y-%m-%d"))
}

/// Write the CSV into `dir` under the dated filename and return its path
pub fn write_export(dir: &Path, resource: &str, date: NaiveDate, csv: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_filename(resource, date));
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, csv).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Harvest {
        farmer: String,
        grade: String,
        kg: f64,
    }

    fn fields() -> Vec<FieldSpec<Harvest>> {
        vec![
            FieldSpec::new("Farmer", |h: &Harvest| h.farmer.clone()),
            FieldSpec::new("Grade", |h: &Harvest| h.grade.clone()),
            FieldSpec::new("Quantity (kg)", |h: &Harvest| h.kg.to_string()),
        ]
    }

    fn harvests() -> Vec<Harvest> {
        vec![
            Harvest { farmer: "Ana Reyes".into(), grade: "S2".into(), kg: 120.5 },
            Harvest { farmer: "Ben Dela Cruz".into(), grade: "JK".into(), kg: 80.0 },
        ]
    }

    #[test]
    fn test_every_cell_quoted() {
        let csv = to_csv(&harvests(), &fields());
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], "Farmer,Grade,Quantity (kg)");
        assert_eq!(lines[1], "\"Ana Reyes\",\"S2\",\"120.5\"");
        assert_eq!(lines[2], "\"Ben Dela Cruz\",\"JK\",\"80\"");
    }

    #[test]
    fn test_naive_split_reconstructs_values() {
        let records = harvests();
        let csv = to_csv(&records, &fields());
        let rows: Vec<Vec<String>> = csv
            .lines()
            .map(|line| {
                line.split(',')
                    .map(|cell| cell.trim_matches('"').to_string())
                    .collect()
            })
            .collect();

        assert_eq!(rows.len(), records.len() + 1);
        assert_eq!(rows[0], vec!["Farmer", "Grade", "Quantity (kg)"]);
        for (row, record) in rows[1..].iter().zip(&records) {
            assert_eq!(row[0], record.farmer);
            assert_eq!(row[1], record.grade);
            assert_eq!(row[2].parse::<f64>().unwrap(), record.kg);
        }
    }

    #[test]
    fn test_embedded_quote_is_not_escaped() {
        let records = vec![Harvest { farmer: "Ana \"Bebang\" Reyes".into(), grade: "S2".into(), kg: 1.0 }];
        let csv = to_csv(&records, &fields());
        assert!(csv.contains("\"Ana \"Bebang\" Reyes\""));
    }

    #[test]
    fn test_empty_collection_is_header_only() {
        let csv = to_csv(&Vec::<Harvest>::new(), &fields());
        assert_eq!(csv, "Farmer,Grade,Quantity (kg)");
    }

    #[test]
    fn test_filename_and_write() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename("farmers", date), "farmers_2024-03-09.csv");

        let tmp = TempDir::new().unwrap();
        let path = write_export(tmp.path(), "farmers", date, "a,b").unwrap();
        assert_eq!(path, tmp.path().join("farmers_2024-03-09.csv"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b");
    }
}
