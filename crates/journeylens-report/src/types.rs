//! Report types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use journeylens_core::{PhaseAveraging, TaxonomyPhase};
use journeylens_enrich::{CohortNlpResult, ConfidenceAmplifier};
use journeylens_infer::{SentimentResult, TopicResult};
use journeylens_metrics::CohortCompleteness;
use serde::Serialize;

/// Provenance of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Dataset file the cohort was read from.
    pub source: Option<String>,
    pub patient_count: usize,
    pub sentiment_backend: Option<String>,
    pub topic_backend: Option<String>,
    /// Amplification settings, when enrichment ran.
    pub amplification: Option<ConfidenceAmplifier>,
    pub phase_averaging: PhaseAveraging,
    pub workers: usize,
}

impl RunMetadata {
    /// New run stamped with a fresh id and the current time.
    pub fn start(phase_averaging: PhaseAveraging, workers: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            source: None,
            patient_count: 0,
            sentiment_backend: None,
            topic_backend: None,
            amplification: None,
            phase_averaging,
            workers,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Elapsed milliseconds, once finished.
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

/// Contents of `analysis_results.json`.
///
/// `sentiment` and `topics` hold one entry per patient per phase, fallback
/// entries included.
#[derive(Debug, Serialize)]
pub struct AnalysisResults<'a> {
    pub sentiment: &'a BTreeMap<TaxonomyPhase, Vec<SentimentResult>>,
    pub topics: &'a BTreeMap<TaxonomyPhase, Vec<TopicResult>>,
    pub completeness: &'a CohortCompleteness,
    pub run: &'a RunMetadata,
}

impl<'a> AnalysisResults<'a> {
    pub fn new(nlp: &'a CohortNlpResult, completeness: &'a CohortCompleteness, run: &'a RunMetadata) -> Self {
        Self {
            sentiment: &nlp.sentiment_per_phase,
            topics: &nlp.topics_per_phase,
            completeness,
            run,
        }
    }
}

/// One row of a phase × column heatmap. `None` cells have no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub phase: TaxonomyPhase,
    pub title: String,
    /// Entries that contributed (fallback entries excluded).
    pub samples: usize,
    pub values: Vec<Option<f64>>,
}

/// Chart-ready phase × column matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

impl Heatmap {
    pub fn row(&self, phase: TaxonomyPhase) -> Option<&HeatmapRow> {
        self.rows.iter().find(|r| r.phase == phase)
    }

    /// Cell value by phase and column name.
    pub fn value(&self, phase: TaxonomyPhase, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.row(phase)?.values.get(col).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessBar {
    pub phase: TaxonomyPhase,
    pub title: String,
    pub score: f64,
}

/// Completeness per phase in taxonomy order, plus the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessBars {
    pub title: String,
    pub overall: f64,
    pub bars: Vec<CompletenessBar>,
}
