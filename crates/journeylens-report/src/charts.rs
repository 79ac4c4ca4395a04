//! Chart-ready summaries of cohort results.
//!
//! Heatmaps cover the main (primary) phases only; secondary phases reuse
//! their parent's text and would duplicate its row. Fallback entries are
//! filtered out by their sentinel before averaging.

use journeylens_core::taxonomy::{self, TOPICS};
use journeylens_core::TaxonomyPhase;
use journeylens_enrich::CohortNlpResult;
use journeylens_infer::SentimentLabel;
use journeylens_metrics::CohortCompleteness;

use crate::types::{CompletenessBar, CompletenessBars, Heatmap, HeatmapRow};

/// Phases shown in heatmaps, in taxonomy order.
pub fn main_phases() -> Vec<TaxonomyPhase> {
    taxonomy::primary_phases().collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Mean confidence per sentiment label per main phase, over non-fallback
/// entries. A phase with no real entries has an empty row; a label never
/// predicted for a phase that has real entries reads 0.0.
pub fn sentiment_heatmap(nlp: &CohortNlpResult) -> Heatmap {
    let rows = main_phases()
        .into_iter()
        .map(|phase| {
            let real: Vec<_> = nlp
                .sentiment(phase)
                .iter()
                .filter(|s| !s.is_fallback())
                .collect();

            let values = SentimentLabel::ALL
                .iter()
                .map(|label| {
                    if real.is_empty() {
                        return None;
                    }
                    let scores: Vec<f64> = real
                        .iter()
                        .filter(|s| s.label == *label)
                        .map(|s| s.score)
                        .collect();
                    Some(mean(&scores).unwrap_or(0.0))
                })
                .collect();

            HeatmapRow {
                phase,
                title: phase.title(),
                samples: real.len(),
                values,
            }
        })
        .collect();

    Heatmap {
        title: "Sentiment Analysis by Phase".into(),
        columns: SentimentLabel::ALL.iter().map(|l| l.as_str().to_string()).collect(),
        rows,
    }
}

/// Mean score per topic per main phase, over entries with any non-zero score.
pub fn topic_heatmap(nlp: &CohortNlpResult) -> Heatmap {
    let rows = main_phases()
        .into_iter()
        .map(|phase| {
            let real: Vec<_> = nlp
                .topics(phase)
                .iter()
                .filter(|t| !t.is_fallback())
                .collect();

            let values = TOPICS
                .iter()
                .map(|topic| {
                    let scores: Vec<f64> = real.iter().filter_map(|t| t.score_for(topic)).collect();
                    mean(&scores)
                })
                .collect();

            HeatmapRow {
                phase,
                title: phase.title(),
                samples: real.len(),
                values,
            }
        })
        .collect();

    Heatmap {
        title: "Topic Distribution by Phase".into(),
        columns: TOPICS.iter().map(|t| t.to_string()).collect(),
        rows,
    }
}

/// Cohort completeness per taxonomy phase.
pub fn completeness_bars(completeness: &CohortCompleteness) -> CompletenessBars {
    CompletenessBars {
        title: "Completeness Score by Phase".into(),
        overall: completeness.overall_completeness,
        bars: completeness
            .ordered()
            .into_iter()
            .map(|(phase, score)| CompletenessBar {
                phase,
                title: phase.title(),
                score,
            })
            .collect(),
    }
}
