//! JourneyLens Enrich: per-phase sentiment and topic annotation.
//!
//! `NlpEnricher` resolves each patient's phases, runs both capabilities on
//! every present phase, and aggregates results per phase in patient order.
//! Confidence amplification is a separate `ConfidenceAmplifier` stage.

pub mod engine;
pub mod postprocess;
pub mod types;

pub use engine::NlpEnricher;
pub use postprocess::ConfidenceAmplifier;
pub use types::{CohortNlpResult, PatientNlp};
