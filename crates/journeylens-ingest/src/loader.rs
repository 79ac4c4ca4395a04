//! Dataset discovery and loading.
//!
//! The first `*.csv` in the data directory wins; without one, the first
//! `*.json` or `*.jsonl`. Rows come back as loosely-typed column maps in file
//! order, cleaning happens afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use journeylens_core::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Supported dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    Csv,
    Json,
    JsonLines,
}

impl DatasetFormat {
    /// Detect format from extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A loaded dataset: column names and one JSON object per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub format: DatasetFormat,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Locates and reads the cohort dataset from a directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Pick the dataset file: first CSV by name, else first JSON/JSONL.
    pub fn find_data_file(&self) -> Result<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.data_dir)
            .map_err(|e| Error::Ingest(format!("cannot read {}: {}", self.data_dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        let format_of = |p: &PathBuf| {
            p.extension()
                .and_then(|e| e.to_str())
                .and_then(DatasetFormat::from_extension)
        };

        files
            .iter()
            .find(|p| format_of(p) == Some(DatasetFormat::Csv))
            .or_else(|| files.iter().find(|p| format_of(p).is_some()))
            .cloned()
            .ok_or_else(|| Error::Ingest(format!("No data files found in {}", self.data_dir.display())))
    }

    /// Load the dataset.
    pub fn load(&self) -> Result<Dataset> {
        let path = self.find_data_file()?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DatasetFormat::from_extension)
            .ok_or_else(|| Error::Ingest(format!("unsupported file: {}", path.display())))?;

        let (columns, rows) = match format {
            DatasetFormat::Csv => read_csv(&path)?,
            DatasetFormat::Json => with_columns(read_json(&fs::read_to_string(&path)?)?),
            DatasetFormat::JsonLines => with_columns(read_json_lines(&fs::read_to_string(&path)?)?),
        };

        info!(
            "Loaded {} rows x {} columns from {}",
            rows.len(),
            columns.len(),
            path.display()
        );
        debug!("Columns: {:?}", columns);

        Ok(Dataset {
            source: path,
            format,
            columns,
            rows,
        })
    }
}

type Rows = Vec<Map<String, Value>>;

/// Columns in header order, then rows.
fn read_csv(path: &Path) -> Result<(Vec<String>, Rows)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Csv(e.to_string()))?;
    let headers = reader.headers().map_err(|e| Error::Csv(e.to_string()))?.clone();
    let columns = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Csv(format!("row {}: {}", i + 1, e)))?;
        if record.len() != headers.len() {
            debug!("Row {} has {} fields, header has {}", i + 1, record.len(), headers.len());
        }
        // Short rows: trailing columns are missing. Extra fields are ignored.
        let row = headers
            .iter()
            .enumerate()
            .map(|(j, column)| {
                let value = match record.get(j) {
                    Some(field) if !field.is_empty() => Value::String(field.to_string()),
                    _ => Value::Null,
                };
                (column.to_string(), value)
            })
            .collect();
        rows.push(row);
    }
    Ok((columns, rows))
}

/// Array of row objects, or a column-oriented object
/// (`{column: {row_index: value}}`).
fn read_json(content: &str) -> Result<Rows> {
    let value: Value = serde_json::from_str(content)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                _ => Err(Error::Ingest(format!("row {} is not an object", i))),
            })
            .collect(),
        Value::Object(columns) => from_columns(columns),
        _ => Err(Error::Ingest("JSON dataset must be an array or an object of columns".into())),
    }
}

fn read_json_lines(content: &str) -> Result<Rows> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| match serde_json::from_str::<Value>(line)? {
            Value::Object(row) => Ok(row),
            _ => Err(Error::Ingest(format!("line {} is not an object", i + 1))),
        })
        .collect()
}

fn from_columns(columns: Map<String, Value>) -> Result<Rows> {
    let mut rows: BTreeMap<usize, Map<String, Value>> = BTreeMap::new();

    for (column, cells) in columns {
        let Value::Object(cells) = cells else {
            return Err(Error::Ingest(format!("column {} is not an index map", column)));
        };
        for (index, value) in cells {
            let index: usize = index
                .parse()
                .map_err(|_| Error::Ingest(format!("non-numeric row index {} in {}", index, column)))?;
            rows.entry(index).or_default().insert(column.clone(), value);
        }
    }

    Ok(rows.into_values().collect())
}

/// JSON objects carry no column order; columns are listed in first-seen order.
fn with_columns(rows: Rows) -> (Vec<String>, Rows) {
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    (columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_and_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::new(dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("No data files found"));

        let err = DataLoader::new(dir.path().join("nope")).load().unwrap_err();
        assert!(matches!(err, Error::Ingest(_)));
    }

    #[test]
    fn test_csv_preferred_over_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "[]").unwrap();
        fs::write(dir.path().join("b.csv"), "patient_id\n1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loader = DataLoader::new(dir.path());
        assert!(loader.find_data_file().unwrap().ends_with("b.csv"));
    }

    #[test]
    fn test_load_csv_with_embedded_json() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "patient_id,age_range,chat_summary_per_phase\n\
                   p1,30-39,\"{\"\"diagnosis\"\": \"\"Confirmed by MRI\"\"}\"\n\
                   p2,,\n";
        fs::write(dir.path().join("patients.csv"), csv).unwrap();

        let dataset = DataLoader::new(dir.path()).load().unwrap();
        assert_eq!(dataset.format, DatasetFormat::Csv);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns, vec!["patient_id", "age_range", "chat_summary_per_phase"]);
        assert_eq!(
            dataset.rows[0]["chat_summary_per_phase"],
            Value::String(r#"{"diagnosis": "Confirmed by MRI"}"#.into())
        );
        assert_eq!(dataset.rows[1]["age_range"], Value::Null);
    }

    #[test]
    fn test_load_csv_with_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "patient_id,age_range,chat_summary_per_phase\n\
                   p1,40-49\n\
                   p2,50-59,\"{\"\"diagnosis\"\": \"\"MRI\"\"}\",extra\n\
                   p3,60-69,{}\n";
        fs::write(dir.path().join("patients.csv"), csv).unwrap();

        let dataset = DataLoader::new(dir.path()).load().unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[0]["patient_id"], "p1");
        assert_eq!(dataset.rows[0]["chat_summary_per_phase"], Value::Null);
        assert_eq!(dataset.rows[1]["chat_summary_per_phase"], r#"{"diagnosis": "MRI"}"#);
        assert_eq!(dataset.rows[1].len(), 3);
        assert_eq!(dataset.rows[2]["age_range"], "60-69");
    }

    #[test]
    fn test_load_json_array_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("data.json"),
            r#"[{"patient_id": 1, "chat_summary_per_phase": {"treatment": "Surgery"}}]"#,
        )
        .unwrap();
        let dataset = DataLoader::new(dir.path()).load().unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rows[0]["patient_id"], 1);

        assert_eq!(read_json_lines("{\"a\": 1}\n\n{\"a\": 2}\n").unwrap().len(), 2);
        assert!(read_json_lines("[1]").is_err());
    }

    #[test]
    fn test_load_column_oriented_json() {
        let content = r#"{
            "patient_id": {"0": "a", "1": "b", "10": "c", "2": "d"},
            "chat_summary_per_phase": {"1": "{}", "0": null}
        }"#;
        let rows = read_json(content).unwrap();
        assert_eq!(rows.len(), 4);
        let ids: Vec<&str> = rows.iter().map(|r| r["patient_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "d", "c"]);
        assert_eq!(rows[0]["chat_summary_per_phase"], Value::Null);
        assert!(!rows[2].contains_key("chat_summary_per_phase"));
    }
}
