//! Phase resolution. Reconciles a patient's raw phase texts against the
//! journey taxonomy. Shared by the completeness scorer and NLP enrichment,
//! each of which resolves independently.

pub mod resolver;
pub mod types;

pub use resolver::PhaseResolver;
pub use types::*;
