//! JourneyLens Report: raw results JSON, chart-ready summaries, text report.
//!
//! Pure consumers of the completeness and enrichment outputs.

pub mod charts;
pub mod print;
pub mod types;
pub mod writer;

pub use charts::{completeness_bars, main_phases, sentiment_heatmap, topic_heatmap};
pub use print::{format_report, print_report, ReportSummary};
pub use types::*;
pub use writer::{ChartSet, ResultsWriter, RESULTS_FILE};
