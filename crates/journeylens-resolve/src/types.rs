//! Resolver types.

use journeylens_core::TaxonomyPhase;
use serde::Serialize;

/// Resolution state of one taxonomy phase for one patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedPhase<'a> {
    pub present: bool,
    /// Backing text. Secondary phases borrow their parent's text.
    pub text: Option<&'a str>,
    /// Whether the phase was looked at. A secondary phase whose keywords were
    /// searched and not found is evaluated but not present.
    #[serde(skip)]
    pub evaluated: bool,
}

impl<'a> ResolvedPhase<'a> {
    pub fn present(text: &'a str) -> Self {
        Self {
            present: true,
            text: Some(text),
            evaluated: true,
        }
    }

    pub fn absent() -> Self {
        Self {
            present: false,
            text: None,
            evaluated: true,
        }
    }
}

/// Every taxonomy phase resolved for one patient, in taxonomy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedJourney<'a> {
    phases: [ResolvedPhase<'a>; TaxonomyPhase::COUNT],
}

impl<'a> ResolvedJourney<'a> {
    /// All phases unevaluated and absent.
    pub fn empty() -> Self {
        Self {
            phases: [ResolvedPhase::default(); TaxonomyPhase::COUNT],
        }
    }

    pub fn get(&self, phase: TaxonomyPhase) -> &ResolvedPhase<'a> {
        &self.phases[phase.index()]
    }

    pub(crate) fn set(&mut self, phase: TaxonomyPhase, resolved: ResolvedPhase<'a>) {
        self.phases[phase.index()] = resolved;
    }

    pub fn is_present(&self, phase: TaxonomyPhase) -> bool {
        self.get(phase).present
    }

    /// Backing text of a present phase.
    pub fn text(&self, phase: TaxonomyPhase) -> Option<&'a str> {
        let resolved = self.get(phase);
        if resolved.present {
            resolved.text
        } else {
            None
        }
    }

    /// `(phase, resolution)` pairs in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (TaxonomyPhase, &ResolvedPhase<'a>)> {
        TaxonomyPhase::ALL.into_iter().zip(self.phases.iter())
    }

    /// Present phases with their backing text, in taxonomy order.
    pub fn present(&self) -> impl Iterator<Item = (TaxonomyPhase, &'a str)> + '_ {
        self.iter()
            .filter_map(|(phase, r)| if r.present { r.text.map(|t| (phase, t)) } else { None })
    }

    pub fn present_count(&self) -> usize {
        self.phases.iter().filter(|p| p.present).count()
    }
}

impl Serialize for ResolvedJourney<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(TaxonomyPhase::COUNT))?;
        for (phase, resolved) in self.iter() {
            map.serialize_entry(&phase, resolved)?;
        }
        map.end()
    }
}
