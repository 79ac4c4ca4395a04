//! Phase resolver: maps a patient's raw phase texts onto the taxonomy.

use journeylens_core::taxonomy::{self, PHASE_MAPPING};
use journeylens_core::RawPhaseMap;
use tracing::trace;

use crate::types::{ResolvedJourney, ResolvedPhase};

/// Resolves raw phase texts into present/absent taxonomy phases.
pub struct PhaseResolver;

impl PhaseResolver {
    /// Resolve every taxonomy phase for one patient.
    ///
    /// Primary phases are present when their raw key has non-empty text.
    /// Secondary phases are searched for inside that text and, when a keyword
    /// matches, share it; otherwise they are recorded as evaluated and absent.
    pub fn resolve(raw: &RawPhaseMap) -> ResolvedJourney<'_> {
        let mut journey = ResolvedJourney::empty();

        for (raw_key, primary) in PHASE_MAPPING {
            let Some(text) = raw.get(raw_key) else {
                continue;
            };
            journey.set(primary, ResolvedPhase::present(text));

            for &secondary in taxonomy::secondary_phases(raw_key) {
                let resolved = if taxonomy::matches_keywords(text, secondary) {
                    ResolvedPhase::present(text)
                } else {
                    ResolvedPhase::absent()
                };
                trace!("{} in {}: present={}", secondary, raw_key, resolved.present);
                journey.set(secondary, resolved);
            }
        }

        journey
    }
}
