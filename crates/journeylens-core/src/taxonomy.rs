//! Static journey taxonomy: phase mapping, secondary-phase keywords, weights.
//!
//! Every table here is immutable, process-wide constant data. Primary phases
//! are backed directly by one raw key's text; secondary phases are detected by
//! keyword search inside a primary phase's text and share that text.

use crate::phase::{RawPhaseKey, TaxonomyPhase};

/// Raw key → primary taxonomy phase, in resolution order.
pub const PHASE_MAPPING: [(RawPhaseKey, TaxonomyPhase); 5] = [
    (RawPhaseKey::EarlySymptomsPhase, TaxonomyPhase::SymptomOnset),
    (RawPhaseKey::ReferralPathway, TaxonomyPhase::PreDiagnostic),
    (RawPhaseKey::Diagnosis, TaxonomyPhase::PrimaryDiagnostic),
    (RawPhaseKey::Treatment, TaxonomyPhase::NewTreatment),
    (RawPhaseKey::OngoingCare, TaxonomyPhase::OngoingCare),
];

/// Medical terms rewarded by the completeness content score.
pub const MEDICAL_TERMS: [&str; 5] = ["diagnosis", "treatment", "symptoms", "doctor", "medication"];

/// Candidate vocabulary for multi-label topic classification.
pub const TOPICS: [&str; 8] = [
    "symptoms",
    "diagnosis",
    "treatment",
    "medication",
    "side effects",
    "doctor visits",
    "emotional state",
    "daily life impact",
];

const DECISION_KEYWORDS: &[&str] = &["decide", "decision", "chose", "choice", "opt", "option", "consider"];

const REEVALUATION_KEYWORDS: &[&str] = &[
    "reevaluation",
    "reassess",
    "follow-up",
    "follow up",
    "monitoring",
    "review",
];

/// Secondary phases that may be detected inside a raw key's text.
pub fn secondary_phases(key: RawPhaseKey) -> &'static [TaxonomyPhase] {
    match key {
        RawPhaseKey::Diagnosis => &[TaxonomyPhase::Decision],
        RawPhaseKey::Treatment => &[TaxonomyPhase::Reevaluation],
        _ => &[],
    }
}

/// Primary phases in taxonomy order.
pub fn primary_phases() -> impl Iterator<Item = TaxonomyPhase> {
    PHASE_MAPPING.iter().map(|(_, phase)| *phase)
}

/// Keyword set for phases that require detection. Phases without one are
/// present whenever their primary raw key has content.
pub fn keywords(phase: TaxonomyPhase) -> Option<&'static [&'static str]> {
    match phase {
        TaxonomyPhase::Decision => Some(DECISION_KEYWORDS),
        TaxonomyPhase::Reevaluation => Some(REEVALUATION_KEYWORDS),
        _ => None,
    }
}

/// Importance weight used in the weighted overall completeness.
pub fn weight(phase: TaxonomyPhase) -> f64 {
    match phase {
        TaxonomyPhase::SymptomOnset => 1.0,
        TaxonomyPhase::PreDiagnostic => 1.0,
        TaxonomyPhase::PrimaryDiagnostic => 1.5,
        TaxonomyPhase::Decision => 1.2,
        TaxonomyPhase::NewTreatment => 1.3,
        TaxonomyPhase::OngoingCare => 1.0,
        TaxonomyPhase::Reevaluation => 1.0,
    }
}

/// Sum of all taxonomy weights (denominator of the overall score).
pub fn total_weight() -> f64 {
    TaxonomyPhase::ALL.iter().map(|p| weight(*p)).sum()
}

/// Case-insensitive substring search of a phase's keyword set in `text`.
///
/// Phases without a keyword set never match.
pub fn matches_keywords(text: &str, phase: TaxonomyPhase) -> bool {
    if text.is_empty() {
        return false;
    }
    let Some(words) = keywords(phase) else {
        return false;
    };
    let lowered = text.to_lowercase();
    words.iter().any(|kw| lowered.contains(&kw.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phase_has_positive_weight() {
        for phase in TaxonomyPhase::ALL {
            assert!(weight(phase) > 0.0, "{} has no weight", phase);
        }
        assert!((total_weight() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_mapping_is_consistent() {
        // Every raw key backs exactly one primary phase, in key order
        let keys: Vec<RawPhaseKey> = PHASE_MAPPING.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, RawPhaseKey::ALL.to_vec());
        let phases: std::collections::BTreeSet<TaxonomyPhase> = primary_phases().collect();
        assert_eq!(phases.len(), PHASE_MAPPING.len());
        // Secondary phases are never primary targets
        for key in RawPhaseKey::ALL {
            for secondary in secondary_phases(key) {
                assert!(primary_phases().all(|p| p != *secondary));
                assert!(keywords(*secondary).is_some());
            }
        }
    }

    #[test]
    fn test_keyword_detection() {
        let content = "Patient decided to proceed with the treatment option";
        assert!(matches_keywords(content, TaxonomyPhase::Decision));
        assert!(!matches_keywords(content, TaxonomyPhase::Reevaluation));
        assert!(!matches_keywords("", TaxonomyPhase::Decision));
        assert!(matches_keywords("Regular FOLLOW-UP and monitoring", TaxonomyPhase::Reevaluation));
        assert!(!matches_keywords("Normal symptoms description", TaxonomyPhase::Decision));
    }

    #[test]
    fn test_phases_without_keywords_never_match() {
        assert!(!matches_keywords("decision review", TaxonomyPhase::SymptomOnset));
    }
}
