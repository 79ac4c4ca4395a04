//! Runtime types.

use std::path::PathBuf;

use journeylens_core::PatientRecord;
use journeylens_enrich::CohortNlpResult;
use journeylens_ingest::IngestReport;
use journeylens_metrics::CohortCompleteness;
use journeylens_report::RunMetadata;
use serde::Serialize;

/// Pipeline verb that can be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Load the dataset, clean summaries, write the cleaned CSV.
    Ingest,
    /// Completeness scoring and cohort aggregation.
    Score,
    /// Per-phase sentiment and topic enrichment.
    Enrich,
    /// Persist results and chart summaries.
    Report,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Score => "score",
            Self::Enrich => "enrich",
            Self::Report => "report",
        }
    }
}

/// Concurrency budget for enrichment.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceBudget {
    /// Patients enriched at once (1 = sequential).
    #[serde(rename = "maxConcurrency")]
    pub max_concurrency: usize,
    /// Async worker threads driving the blocking pool.
    #[serde(rename = "driverThreads")]
    pub driver_threads: usize,
}

impl ResourceBudget {
    pub fn for_workers(workers: usize) -> Self {
        let max_concurrency = workers.max(1);
        Self {
            max_concurrency,
            driver_threads: max_concurrency.clamp(1, 2),
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.max_concurrency <= 1
    }
}

/// Output of the ingest verb.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub source: PathBuf,
    pub records: Vec<PatientRecord>,
    pub report: IngestReport,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run: RunMetadata,
    pub ingest: IngestReport,
    pub completeness: CohortCompleteness,
    /// Absent for scoring-only runs.
    pub nlp: Option<CohortNlpResult>,
    pub files: Vec<PathBuf>,
}
