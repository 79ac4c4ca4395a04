//! Enrichment result types.

use std::collections::BTreeMap;

use journeylens_core::TaxonomyPhase;
use journeylens_infer::{SentimentResult, TopicResult};
use serde::Serialize;

/// Sentiment and topics for every taxonomy phase of one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientNlp {
    pub sentiment: BTreeMap<TaxonomyPhase, SentimentResult>,
    pub topics: BTreeMap<TaxonomyPhase, TopicResult>,
    /// Inference calls that failed and were replaced by a fallback.
    #[serde(skip)]
    pub failures: usize,
}

impl PatientNlp {
    /// Every phase at its fallback value.
    pub fn fallback() -> Self {
        Self {
            sentiment: TaxonomyPhase::ALL
                .iter()
                .map(|p| (*p, SentimentResult::fallback()))
                .collect(),
            topics: TaxonomyPhase::ALL
                .iter()
                .map(|p| (*p, TopicResult::fallback()))
                .collect(),
            failures: 0,
        }
    }
}

/// Per-phase results across a cohort, one entry per patient in input order.
///
/// Fallback entries are kept; consumers filter them by their sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortNlpResult {
    pub sentiment_per_phase: BTreeMap<TaxonomyPhase, Vec<SentimentResult>>,
    pub topics_per_phase: BTreeMap<TaxonomyPhase, Vec<TopicResult>>,
    #[serde(skip)]
    pub patient_count: usize,
    #[serde(skip)]
    pub inference_failures: usize,
}

impl CohortNlpResult {
    pub fn new() -> Self {
        Self {
            sentiment_per_phase: TaxonomyPhase::ALL.iter().map(|p| (*p, Vec::new())).collect(),
            topics_per_phase: TaxonomyPhase::ALL.iter().map(|p| (*p, Vec::new())).collect(),
            patient_count: 0,
            inference_failures: 0,
        }
    }

    /// Append one patient's results to every phase sequence.
    pub fn push(&mut self, patient: PatientNlp) {
        for (phase, sentiment) in patient.sentiment {
            self.sentiment_per_phase.entry(phase).or_default().push(sentiment);
        }
        for (phase, topics) in patient.topics {
            self.topics_per_phase.entry(phase).or_default().push(topics);
        }
        self.patient_count += 1;
        self.inference_failures += patient.failures;
    }

    /// Sentiment entries for a phase (empty if the cohort was empty).
    pub fn sentiment(&self, phase: TaxonomyPhase) -> &[SentimentResult] {
        self.sentiment_per_phase.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn topics(&self, phase: TaxonomyPhase) -> &[TopicResult] {
        self.topics_per_phase.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for CohortNlpResult {
    fn default() -> Self {
        Self::new()
    }
}
