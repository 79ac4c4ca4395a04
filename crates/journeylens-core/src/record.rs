//! Per-patient raw phase records handed to the core by ingestion.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::phase::RawPhaseKey;

/// Raw phase → text mapping for one patient, keyed by the closed raw-key set.
///
/// Unknown keys are dropped on deserialization and non-string values are
/// stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhaseMap {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub early_symptoms_phase: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub referral_pathway: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub ongoing_care: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

impl RawPhaseMap {
    /// Build from `(raw key, text)` pairs, ignoring unknown keys.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut map = Self::default();
        for (key, text) in pairs {
            if let Some(key) = RawPhaseKey::from_key(key) {
                map.set(key, text.map(str::to_string));
            }
        }
        map
    }

    /// Build from a loosely-typed JSON object. Anything that isn't an object
    /// yields an empty map.
    pub fn from_json(value: &Value) -> Self {
        let mut map = Self::default();
        if let Value::Object(obj) = value {
            for (key, v) in obj {
                if let (Some(key), Value::String(text)) = (RawPhaseKey::from_key(key), v) {
                    map.set(key, Some(text.clone()));
                }
            }
        }
        map
    }

    fn slot(&self, key: RawPhaseKey) -> &Option<String> {
        match key {
            RawPhaseKey::EarlySymptomsPhase => &self.early_symptoms_phase,
            RawPhaseKey::ReferralPathway => &self.referral_pathway,
            RawPhaseKey::Diagnosis => &self.diagnosis,
            RawPhaseKey::Treatment => &self.treatment,
            RawPhaseKey::OngoingCare => &self.ongoing_care,
        }
    }

    fn slot_mut(&mut self, key: RawPhaseKey) -> &mut Option<String> {
        match key {
            RawPhaseKey::EarlySymptomsPhase => &mut self.early_symptoms_phase,
            RawPhaseKey::ReferralPathway => &mut self.referral_pathway,
            RawPhaseKey::Diagnosis => &mut self.diagnosis,
            RawPhaseKey::Treatment => &mut self.treatment,
            RawPhaseKey::OngoingCare => &mut self.ongoing_care,
        }
    }

    /// Non-empty text for a raw key. Empty strings count as absent.
    pub fn get(&self, key: RawPhaseKey) -> Option<&str> {
        self.slot(key).as_deref().filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, key: RawPhaseKey, text: Option<String>) {
        *self.slot_mut(key) = text;
    }

    /// Apply `f` to every stored text in place.
    pub fn map_texts(&mut self, mut f: impl FnMut(&str) -> String) {
        for key in RawPhaseKey::ALL {
            if let Some(text) = self.slot_mut(key).as_mut() {
                *text = f(text);
            }
        }
    }

    /// Raw keys that carry non-empty text.
    pub fn present_keys(&self) -> impl Iterator<Item = RawPhaseKey> + '_ {
        RawPhaseKey::ALL.into_iter().filter(|k| self.get(*k).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.present_keys().next().is_none()
    }
}

/// One cleaned dataset row: patient identity plus raw phase texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub summary: RawPhaseMap,
}

impl PatientRecord {
    pub fn new(patient_id: impl Into<String>, summary: RawPhaseMap) -> Self {
        Self {
            patient_id: patient_id.into(),
            summary,
        }
    }
}
