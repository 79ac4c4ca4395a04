//! Per-patient completeness scoring.

use std::collections::{BTreeMap, BTreeSet};

use journeylens_core::taxonomy::{self, MEDICAL_TERMS};
use journeylens_core::RawPhaseMap;
use journeylens_resolve::PhaseResolver;
use tracing::trace;

use crate::types::PatientCompleteness;

/// Characters at which the length contribution saturates.
const LENGTH_SATURATION: f64 = 500.0;
/// Maximum contribution of raw text length.
const MAX_LENGTH_SCORE: f64 = 0.7;
/// Credit per distinct medical term found.
const TERM_CREDIT: f64 = 0.06;

/// Score the documentation quality of one phase text, in `[0.0, 1.0]`.
///
/// `min(chars / 500, 0.7)` for length plus `0.06` per medical term present
/// (case-insensitive substring, one credit per term).
pub fn content_score(text: &str) -> f64 {
    let content = text.trim();
    if content.is_empty() {
        return 0.0;
    }

    let length_score = (content.chars().count() as f64 / LENGTH_SATURATION).min(MAX_LENGTH_SCORE);

    let lowered = content.to_lowercase();
    let matched = MEDICAL_TERMS.iter().filter(|term| lowered.contains(*term)).count();
    let term_score = matched as f64 * TERM_CREDIT;

    // Components already sum to at most 1.0; this only absorbs rounding.
    (length_score + term_score).min(1.0)
}

/// Computes journey completeness for single patients.
pub struct CompletenessScorer;

impl CompletenessScorer {
    /// Score every taxonomy phase and the weighted overall for one patient.
    ///
    /// Absent phases score 0.0 and still count in the weight denominator.
    pub fn score_patient(raw: &RawPhaseMap) -> PatientCompleteness {
        let journey = PhaseResolver::resolve(raw);

        let mut phases = BTreeMap::new();
        let mut evaluated = BTreeSet::new();
        let mut weighted_sum = 0.0;

        for (phase, resolved) in journey.iter() {
            let score = match resolved.text {
                Some(text) if resolved.present => content_score(text),
                _ => 0.0,
            };
            weighted_sum += score * taxonomy::weight(phase);
            phases.insert(phase, score);
            if resolved.evaluated {
                evaluated.insert(phase);
            }
            trace!("{}: score={:.3}", phase, score);
        }

        PatientCompleteness {
            overall: weighted_sum / taxonomy::total_weight(),
            phases,
            evaluated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeylens_core::TaxonomyPhase;

    fn sample_summary() -> RawPhaseMap {
        RawPhaseMap::from_pairs([
            ("early_symptoms_phase", Some("Patient reported severe headaches and fatigue")),
            (
                "diagnosis",
                Some("Doctor diagnosed condition after blood tests. Patient decided to start treatment."),
            ),
            (
                "treatment",
                Some("Started medication. Regular follow-up monitoring shows improvement."),
            ),
        ])
    }

    #[test]
    fn test_content_score_empty() {
        assert_eq!(content_score(""), 0.0);
        assert_eq!(content_score("   \n\t"), 0.0);
    }

    #[test]
    fn test_content_score_all_terms() {
        let content = "Patient visited doctor for diagnosis of symptoms. Treatment included medication.";
        assert_eq!(content.chars().count(), 80);
        let score = content_score(content);
        assert!((score - (80.0 / 500.0 + 0.30)).abs() < 1e-9);
        assert!((score - 0.46).abs() < 1e-9);
    }

    #[test]
    fn test_medical_term_scoring() {
        let cases = [
            ("Normal text without terms", 0.0),
            ("Patient had symptoms", 0.06),
            ("Doctor diagnosed symptoms", 0.12),
            ("doctor doctor DOCTOR", 0.06),
        ];
        for (content, expected_term_score) in cases {
            let length_score = (content.len() as f64 / 500.0).min(0.7);
            let term_score = content_score(content) - length_score;
            assert!(
                (term_score - expected_term_score).abs() < 1e-9,
                "{}: got {}",
                content,
                term_score
            );
        }
    }

    #[test]
    fn test_length_score_saturates() {
        let long = "a".repeat(1000);
        assert!((content_score(&long) - 0.7).abs() < 1e-9);
        let longest = format!("{} diagnosis treatment symptoms doctor medication", "a".repeat(1000));
        assert!((content_score(&longest) - 1.0).abs() < 1e-9);
        assert!(content_score(&longest) <= 1.0);
    }

    #[test]
    fn test_longer_termed_text_scores_higher() {
        let short = "got sick";
        let long = "Doctor ordered blood tests; diagnosis confirmed and treatment with medication started after symptoms worsened.";
        assert!(content_score(long) >= content_score(short));
    }

    #[test]
    fn test_score_patient_bounds_and_coverage() {
        let result = CompletenessScorer::score_patient(&sample_summary());
        assert!(result.overall >= 0.0 && result.overall <= 1.0);
        assert_eq!(result.phases.len(), TaxonomyPhase::COUNT);
        for score in result.phases.values() {
            assert!(*score >= 0.0 && *score <= 1.0);
        }
        // "decided" and "follow-up" pull in both secondary phases
        assert!(result.phases[&TaxonomyPhase::Decision] > 0.0);
        assert!(result.phases[&TaxonomyPhase::Reevaluation] > 0.0);
        assert_eq!(
            result.phases[&TaxonomyPhase::Decision],
            result.phases[&TaxonomyPhase::PrimaryDiagnostic]
        );
        assert_eq!(result.phases[&TaxonomyPhase::PreDiagnostic], 0.0);
    }

    #[test]
    fn test_overall_is_weighted_mean_over_all_phases() {
        let text = "a".repeat(500);
        let raw = RawPhaseMap::from_pairs([("diagnosis", Some(text.as_str()))]);
        let result = CompletenessScorer::score_patient(&raw);
        // primary_diagnostic: 0.7 × 1.5, everything else absent
        assert!((result.overall - 0.7 * 1.5 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_present_phases_scores_zero() {
        for raw in [
            RawPhaseMap::default(),
            RawPhaseMap::from_pairs([("diagnosis", None)]),
            RawPhaseMap::from_pairs([("invalid_phase", Some("content"))]),
        ] {
            let result = CompletenessScorer::score_patient(&raw);
            assert_eq!(result.overall, 0.0);
            assert!(result.phases.values().all(|s| *s == 0.0));
        }
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let ordered: RawPhaseMap = serde_json::from_str(
            r#"{"early_symptoms_phase": "Initial symptoms", "diagnosis": "Got diagnosed", "treatment": "Started treatment"}"#,
        )
        .unwrap();
        let unordered: RawPhaseMap = serde_json::from_str(
            r#"{"treatment": "Started treatment", "early_symptoms_phase": "Initial symptoms", "diagnosis": "Got diagnosed"}"#,
        )
        .unwrap();
        assert_eq!(
            CompletenessScorer::score_patient(&ordered),
            CompletenessScorer::score_patient(&unordered)
        );
    }

    #[test]
    fn test_content_quality_impact() {
        let high = RawPhaseMap::from_pairs([(
            "diagnosis",
            Some("Doctor performed thorough examination. Blood tests showed elevated levels. Patient diagnosed with condition X."),
        )]);
        let low = RawPhaseMap::from_pairs([("diagnosis", Some("got sick. doctor saw me."))]);
        assert!(
            CompletenessScorer::score_patient(&high).overall
                > CompletenessScorer::score_patient(&low).overall
        );
    }

    #[test]
    fn test_whitespace_text_is_present_but_scores_zero() {
        let raw = RawPhaseMap::from_pairs([("diagnosis", Some("   "))]);
        let result = CompletenessScorer::score_patient(&raw);
        assert!(result.evaluated.contains(&TaxonomyPhase::PrimaryDiagnostic));
        assert_eq!(result.phases[&TaxonomyPhase::PrimaryDiagnostic], 0.0);
    }
}
