//! JourneyLens Ingest: dataset loading and chat-summary cleaning.
//!
//! Hands the core one `PatientRecord` per patient, with phase texts keyed by
//! the closed raw-key set.

pub mod clean;
pub mod loader;

pub use clean::{clean_chat_summary, normalize_text, write_cleaned_csv, Cleaner, IngestReport, SUMMARY_COLUMN};
pub use loader::{DataLoader, Dataset, DatasetFormat};
