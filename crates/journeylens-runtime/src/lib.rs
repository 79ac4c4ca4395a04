//! JourneyLens Runtime: orchestrates the analysis pipeline.

pub mod orchestrator;
pub mod types;

pub use orchestrator::Orchestrator;
pub use types::*;
