//! JourneyLens Core: journey taxonomy, raw phase records, configuration.

pub mod config;
pub mod error;
pub mod phase;
pub mod record;
pub mod taxonomy;

pub use config::{AnalysisConfig, DataPaths, InferenceConfig, PhaseAveraging};
pub use error::{Error, Result};
pub use phase::{RawPhaseKey, TaxonomyPhase};
pub use record::{PatientRecord, RawPhaseMap};
