//! Cohort-level completeness aggregation.

use journeylens_core::{Error, PhaseAveraging, RawPhaseMap, Result, TaxonomyPhase};
use tracing::{debug, info};

use crate::scorer::CompletenessScorer;
use crate::types::{CohortCompleteness, PatientCompleteness};

/// Patients between progress log lines.
const PROGRESS_INTERVAL: usize = 100;

/// Incremental cohort aggregate. Patient results are folded in one at a
/// time and discarded; `finalize` produces the means.
#[derive(Debug, Clone)]
pub struct CohortAccumulator {
    averaging: PhaseAveraging,
    patients: usize,
    overall_sum: f64,
    phase_sums: [f64; TaxonomyPhase::COUNT],
    phase_evaluated: [usize; TaxonomyPhase::COUNT],
}

impl CohortAccumulator {
    pub fn new(averaging: PhaseAveraging) -> Self {
        Self {
            averaging,
            patients: 0,
            overall_sum: 0.0,
            phase_sums: [0.0; TaxonomyPhase::COUNT],
            phase_evaluated: [0; TaxonomyPhase::COUNT],
        }
    }

    /// Fold one patient's completeness into the aggregate.
    pub fn add(&mut self, patient: &PatientCompleteness) {
        self.patients += 1;
        self.overall_sum += patient.overall;
        for phase in TaxonomyPhase::ALL {
            let i = phase.index();
            self.phase_sums[i] += patient.phases.get(&phase).copied().unwrap_or(0.0);
            if patient.evaluated.contains(&phase) {
                self.phase_evaluated[i] += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.patients
    }

    pub fn is_empty(&self) -> bool {
        self.patients == 0
    }

    /// Compute cohort means. Fails on an empty cohort.
    pub fn finalize(self) -> Result<CohortCompleteness> {
        if self.patients == 0 {
            return Err(Error::EmptyCohort(
                "cannot average completeness over zero patients".into(),
            ));
        }

        let n = self.patients as f64;
        let phase_completeness = TaxonomyPhase::ALL
            .iter()
            .map(|phase| {
                let i = phase.index();
                let mean = match self.averaging {
                    PhaseAveraging::Cohort => self.phase_sums[i] / n,
                    PhaseAveraging::Evaluated if self.phase_evaluated[i] == 0 => 0.0,
                    PhaseAveraging::Evaluated => self.phase_sums[i] / self.phase_evaluated[i] as f64,
                };
                (*phase, mean)
            })
            .collect();

        Ok(CohortCompleteness {
            overall_completeness: self.overall_sum / n,
            phase_completeness,
            patient_count: self.patients,
            averaging: self.averaging,
        })
    }
}

/// Score every patient and average across the cohort.
///
/// `overall_completeness` is the mean of per-patient overall scores. Phase
/// means follow `averaging`. An empty cohort is an error, not a zero.
pub fn calculate_phase_completeness<'a, I>(patients: I, averaging: PhaseAveraging) -> Result<CohortCompleteness>
where
    I: IntoIterator<Item = &'a RawPhaseMap>,
{
    let mut acc = CohortAccumulator::new(averaging);

    for raw in patients {
        let completeness = CompletenessScorer::score_patient(raw);
        acc.add(&completeness);
        if acc.len() % PROGRESS_INTERVAL == 0 {
            info!("Completeness: {} patients scored", acc.len());
        }
    }

    let cohort = acc.finalize()?;

    info!(
        "Completeness for {} patients: overall={:.3}",
        cohort.patient_count, cohort.overall_completeness
    );
    for (phase, score) in cohort.ordered() {
        debug!("{}: {:.2}", phase, score);
    }

    Ok(cohort)
}
