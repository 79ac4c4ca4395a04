//! Completeness types.

use std::collections::{BTreeMap, BTreeSet};

use journeylens_core::{PhaseAveraging, TaxonomyPhase};
use serde::{Deserialize, Serialize};

/// Score per taxonomy phase, in taxonomy order.
pub type PhaseScores = BTreeMap<TaxonomyPhase, f64>;

/// Completeness of one patient's journey. Every taxonomy phase is reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientCompleteness {
    /// Weighted mean of phase scores over all taxonomy weights.
    pub overall: f64,
    pub phases: PhaseScores,
    /// Phases the resolver evaluated (present, or searched and not found).
    #[serde(skip)]
    pub evaluated: BTreeSet<TaxonomyPhase>,
}

/// Completeness averaged over a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortCompleteness {
    pub overall_completeness: f64,
    pub phase_completeness: PhaseScores,
    pub patient_count: usize,
    pub averaging: PhaseAveraging,
}

impl CohortCompleteness {
    /// Phase scores in taxonomy order.
    pub fn ordered(&self) -> Vec<(TaxonomyPhase, f64)> {
        TaxonomyPhase::ALL
            .iter()
            .map(|p| (*p, self.phase_completeness.get(p).copied().unwrap_or(0.0)))
            .collect()
    }
}
