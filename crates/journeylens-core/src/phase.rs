//! Journey phase enumerations: raw dataset keys and the canonical taxonomy.

use serde::{Deserialize, Serialize};

/// Canonical stage of a documented patient journey.
///
/// The set is closed and ordered; every output reports all members in this
/// order, using fallback values where a phase is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyPhase {
    SymptomOnset,
    PreDiagnostic,
    PrimaryDiagnostic,
    Decision,
    NewTreatment,
    OngoingCare,
    Reevaluation,
}

impl TaxonomyPhase {
    pub const COUNT: usize = 7;

    /// All phases in taxonomy order.
    pub const ALL: [TaxonomyPhase; Self::COUNT] = [
        Self::SymptomOnset,
        Self::PreDiagnostic,
        Self::PrimaryDiagnostic,
        Self::Decision,
        Self::NewTreatment,
        Self::OngoingCare,
        Self::Reevaluation,
    ];

    /// Position in taxonomy order, usable as an array index.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SymptomOnset => "symptom_onset",
            Self::PreDiagnostic => "pre_diagnostic",
            Self::PrimaryDiagnostic => "primary_diagnostic",
            Self::Decision => "decision",
            Self::NewTreatment => "new_treatment",
            Self::OngoingCare => "ongoing_care",
            Self::Reevaluation => "reevaluation",
        }
    }

    /// Human-readable title ("Primary Diagnostic").
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for TaxonomyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset-level field holding free text for one journey segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPhaseKey {
    EarlySymptomsPhase,
    ReferralPathway,
    Diagnosis,
    Treatment,
    OngoingCare,
}

impl RawPhaseKey {
    pub const ALL: [RawPhaseKey; 5] = [
        Self::EarlySymptomsPhase,
        Self::ReferralPathway,
        Self::Diagnosis,
        Self::Treatment,
        Self::OngoingCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EarlySymptomsPhase => "early_symptoms_phase",
            Self::ReferralPathway => "referral_pathway",
            Self::Diagnosis => "diagnosis",
            Self::Treatment => "treatment",
            Self::OngoingCare => "ongoing_care",
        }
    }

    /// Look up a raw key by its dataset name. Unknown names yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl std::fmt::Display for RawPhaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_matches_index() {
        for (i, phase) in TaxonomyPhase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
        assert!(TaxonomyPhase::SymptomOnset < TaxonomyPhase::Reevaluation);
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_string(&TaxonomyPhase::PrimaryDiagnostic).unwrap();
        assert_eq!(json, "\"primary_diagnostic\"");
        assert_eq!(TaxonomyPhase::NewTreatment.title(), "New Treatment");
    }

    #[test]
    fn test_raw_key_lookup() {
        assert_eq!(RawPhaseKey::from_key("referral_pathway"), Some(RawPhaseKey::ReferralPathway));
        assert_eq!(RawPhaseKey::from_key("invalid_phase"), None);
        for key in RawPhaseKey::ALL {
            assert_eq!(RawPhaseKey::from_key(key.as_str()), Some(key));
        }
    }
}
