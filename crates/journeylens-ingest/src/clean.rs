//! Chat-summary cleaning: dataset rows → patient records.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use journeylens_core::{Error, PatientRecord, RawPhaseKey, RawPhaseMap, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::loader::Dataset;

/// Column holding the per-phase chat summary.
pub const SUMMARY_COLUMN: &str = "chat_summary_per_phase";

/// Identity columns, in lookup order.
const ID_COLUMNS: [&str; 2] = ["patient_id", "id"];

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Parse a chat summary cell.
///
/// JSON text is decoded first. Returns `None` when the value is not an
/// object (or JSON text of one); a missing or null cell is an empty map.
/// Phase values that are not text (e.g. `{tips, documents}` objects) are
/// dropped by `RawPhaseMap`.
pub fn clean_chat_summary(value: &Value) -> Option<RawPhaseMap> {
    match value {
        Value::Null => Some(RawPhaseMap::default()),
        Value::Object(_) => Some(RawPhaseMap::from_json(value)),
        Value::String(s) if s.trim().is_empty() => Some(RawPhaseMap::default()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Object(_)) => Some(RawPhaseMap::from_json(&parsed)),
            _ => None,
        },
        _ => None,
    }
}

/// Strip markup tags, decode common entities, collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    let decoded = TAG_RE
        .replace_all(text, " ")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn patient_id(row: &Map<String, Value>, index: usize) -> String {
    ID_COLUMNS
        .iter()
        .find_map(|column| match row.get(*column) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| index.to_string())
}

/// Summary of a cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Rows read from the dataset.
    pub rows: usize,
    /// Patient records produced.
    pub patients: usize,
    /// Summary cells that could not be parsed (treated as all phases absent).
    pub parse_failures: usize,
    /// Rows whose patient id was already seen.
    pub duplicate_ids: usize,
    /// Repeated rows removed (only when deduplication is enabled).
    pub duplicates_dropped: usize,
    /// Records with non-empty text per raw key.
    pub phase_counts: BTreeMap<RawPhaseKey, usize>,
}

/// Turns dataset rows into patient records, one per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cleaner {
    normalize: bool,
    dedupe: bool,
}

impl Cleaner {
    pub fn new(normalize: bool) -> Self {
        Self {
            normalize,
            dedupe: false,
        }
    }

    /// Keep only the first row for each patient id.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Clean every row, in file order.
    ///
    /// A patient id may repeat (one row per conversation); repeats are
    /// counted and kept unless deduplication is enabled.
    pub fn clean(&self, dataset: &Dataset) -> (Vec<PatientRecord>, IngestReport) {
        let mut report = IngestReport {
            rows: dataset.len(),
            ..Default::default()
        };

        if !dataset.is_empty() && !dataset.columns.iter().any(|c| c == SUMMARY_COLUMN) {
            warn!("Dataset has no {} column; every phase will be absent", SUMMARY_COLUMN);
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(dataset.len());
        let mut records = Vec::with_capacity(dataset.len());

        for (index, row) in dataset.rows.iter().enumerate() {
            let id = patient_id(row, index);
            if !seen.insert(id.clone()) {
                report.duplicate_ids += 1;
                if self.dedupe {
                    debug!("Dropping duplicate row {} for patient {}", index, id);
                    report.duplicates_dropped += 1;
                    continue;
                }
            }

            let cell = row.get(SUMMARY_COLUMN).unwrap_or(&Value::Null);
            let mut summary = match clean_chat_summary(cell) {
                Some(summary) => summary,
                None => {
                    debug!("Unparsable chat summary for patient {}", id);
                    report.parse_failures += 1;
                    RawPhaseMap::default()
                }
            };

            if self.normalize {
                summary.map_texts(normalize_text);
            }

            for key in summary.present_keys() {
                *report.phase_counts.entry(key).or_insert(0) += 1;
            }
            records.push(PatientRecord::new(id, summary));
        }

        report.patients = records.len();
        info!(
            "Cleaned {} rows into {} records ({} parse failures, {} duplicates dropped)",
            report.rows, report.patients, report.parse_failures, report.duplicates_dropped
        );
        if report.parse_failures > 0 {
            warn!("{} chat summaries could not be parsed", report.parse_failures);
        }
        if report.duplicate_ids > report.duplicates_dropped {
            warn!(
                "{} rows repeat an earlier patient id and are analyzed as separate records",
                report.duplicate_ids - report.duplicates_dropped
            );
        }

        (records, report)
    }
}

/// Write cleaned records as CSV (`patient_id`, `chat_summary_per_phase`).
///
/// The summary column holds JSON text, so the file loads back through
/// `DataLoader`.
pub fn write_cleaned_csv(records: &[PatientRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv(e.to_string()))?;
    writer
        .write_record(["patient_id", SUMMARY_COLUMN])
        .map_err(|e| Error::Csv(e.to_string()))?;

    for record in records {
        let summary = serde_json::to_string(&record.summary)?;
        writer
            .write_record([record.patient_id.as_str(), summary.as_str()])
            .map_err(|e| Error::Csv(e.to_string()))?;
    }
    writer.flush()?;

    info!("Cleaned dataset saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{DataLoader, DatasetFormat};
    use serde_json::json;
    use std::path::PathBuf;

    fn dataset(rows: Vec<Value>) -> Dataset {
        let rows: Vec<Map<String, Value>> = rows
            .into_iter()
            .filter_map(|r| r.as_object().cloned())
            .collect();
        Dataset {
            source: PathBuf::from("test.json"),
            format: DatasetFormat::Json,
            columns: vec!["patient_id".into(), SUMMARY_COLUMN.into()],
            rows,
        }
    }

    #[test]
    fn test_clean_chat_summary_variants() {
        let parsed = clean_chat_summary(&json!(
            r#"{"diagnosis": "Confirmed", "treatment": {"tips": ["rest"], "documents": []}}"#
        ))
        .unwrap();
        assert_eq!(parsed.diagnosis.as_deref(), Some("Confirmed"));
        assert!(parsed.treatment.is_none());

        assert_eq!(clean_chat_summary(&Value::Null), Some(RawPhaseMap::default()));
        assert!(clean_chat_summary(&json!("{not json")).is_none());
        assert!(clean_chat_summary(&json!("[1, 2]")).is_none());
        assert!(clean_chat_summary(&json!(42)).is_none());
        assert!(clean_chat_summary(&json!({"ongoing_care": "Checkups"})).is_some());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("<p>Referred   by&nbsp;GP</p>\n<b>urgent</b> &amp; fast"),
            "Referred by GP urgent & fast"
        );
        assert_eq!(normalize_text("   "), "");
    }

    fn mixed_rows() -> Dataset {
        dataset(vec![
            json!({"patient_id": "p1", SUMMARY_COLUMN: r#"{"diagnosis": "MRI"}"#}),
            json!({"patient_id": "p1", SUMMARY_COLUMN: r#"{"treatment": "Surgery"}"#}),
            json!({"patient_id": 7, SUMMARY_COLUMN: "garbage"}),
            json!({SUMMARY_COLUMN: {"diagnosis": "Biopsy", "ongoing_care": ""}}),
        ])
    }

    #[test]
    fn test_clean_keeps_every_row() {
        let (records, report) = Cleaner::default().clean(&mixed_rows());

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].patient_id, "p1");
        assert_eq!(records[0].summary.diagnosis.as_deref(), Some("MRI"));
        assert_eq!(records[1].patient_id, "p1");
        assert_eq!(records[1].summary.treatment.as_deref(), Some("Surgery"));
        assert_eq!(records[2].patient_id, "7");
        assert!(records[2].summary.is_empty());
        assert_eq!(records[3].patient_id, "3");

        assert_eq!(report.rows, 4);
        assert_eq!(report.patients, 4);
        assert_eq!(report.duplicate_ids, 1);
        assert_eq!(report.duplicates_dropped, 0);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(report.phase_counts.get(&RawPhaseKey::Diagnosis), Some(&2));
        assert_eq!(report.phase_counts.get(&RawPhaseKey::Treatment), Some(&1));
        assert_eq!(report.phase_counts.get(&RawPhaseKey::OngoingCare), None);
    }

    #[test]
    fn test_clean_with_dedupe_keeps_first_row() {
        let (records, report) = Cleaner::default().with_dedupe(true).clean(&mixed_rows());

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].summary.diagnosis.as_deref(), Some("MRI"));
        assert!(records[0].summary.treatment.is_none());
        assert_eq!(records[1].patient_id, "7");
        assert_eq!(report.patients, 3);
        assert_eq!(report.duplicate_ids, 1);
        assert_eq!(report.duplicates_dropped, 1);
    }

    #[test]
    fn test_clean_with_normalization() {
        let data = dataset(vec![json!({"patient_id": "a", SUMMARY_COLUMN: {"treatment": "<i>Chemo</i>  cycle"}})]);
        let (records, _) = Cleaner::new(true).clean(&data);
        assert_eq!(records[0].summary.treatment.as_deref(), Some("Chemo cycle"));
    }

    #[test]
    fn test_cleaned_csv_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            PatientRecord::new("p1", RawPhaseMap::from_pairs([("diagnosis", Some("Confirmed, by \"MRI\""))])),
            PatientRecord::new("p2", RawPhaseMap::default()),
        ];
        let path = dir.path().join("cleaned_dataset.csv");
        write_cleaned_csv(&records, &path).unwrap();

        let dataset = DataLoader::new(dir.path()).load().unwrap();
        let (loaded, report) = Cleaner::default().clean(&dataset);
        assert_eq!(loaded, records);
        assert_eq!(report.parse_failures, 0);
    }
}
