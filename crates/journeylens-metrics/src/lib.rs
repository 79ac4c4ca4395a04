//! Journey completeness metrics: per-patient content scoring and
//! cohort-level aggregation.

pub mod cohort;
pub mod scorer;
pub mod types;

pub use cohort::{calculate_phase_completeness, CohortAccumulator};
pub use scorer::{content_score, CompletenessScorer};
pub use types::*;
