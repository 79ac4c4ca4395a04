//! Plain-text run report.

use std::fmt::Write;
use std::path::PathBuf;

use journeylens_metrics::CohortCompleteness;

use crate::types::{Heatmap, RunMetadata};

/// Everything the text report summarizes.
pub struct ReportSummary<'a> {
    pub run: &'a RunMetadata,
    pub completeness: &'a CohortCompleteness,
    pub sentiment: Option<&'a Heatmap>,
    pub files: &'a [PathBuf],
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:>9.2}", v),
        None => format!("{:>9}", "-"),
    }
}

/// Render the report.
pub fn format_report(summary: &ReportSummary<'_>) -> String {
    let run = summary.run;
    let mut out = String::new();

    let _ = writeln!(out, "=== JourneyLens Analysis Report ===");
    let _ = writeln!(out);
    let _ = writeln!(out, "Run:                {}", run.id);
    if let Some(source) = &run.source {
        let _ = writeln!(out, "Dataset:            {}", source);
    }
    let _ = writeln!(out, "Patients:           {}", run.patient_count);
    let _ = writeln!(out, "Phase averaging:    {:?}", run.phase_averaging);
    if let Some(backend) = &run.sentiment_backend {
        let _ = writeln!(out, "Sentiment backend:  {}", backend);
    }
    if let Some(backend) = &run.topic_backend {
        let _ = writeln!(out, "Topic backend:      {}", backend);
    }
    if let Some(amp) = &run.amplification {
        let state = if amp.enabled { "on" } else { "off" };
        let _ = writeln!(out, "Amplification:      {}", state);
    }
    if let Some(ms) = run.duration_ms() {
        let _ = writeln!(out, "Duration:           {} ms", ms);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Completeness (overall {:.3}):", summary.completeness.overall_completeness);
    for (phase, score) in summary.completeness.ordered() {
        let _ = writeln!(out, "  {:<20} {:.3}", phase.title(), score);
    }

    if let Some(heatmap) = summary.sentiment {
        let _ = writeln!(out);
        let _ = write!(out, "Sentiment:\n  {:<20}", "");
        for column in &heatmap.columns {
            let _ = write!(out, "{:>9}", column);
        }
        let _ = writeln!(out);
        for row in &heatmap.rows {
            let _ = write!(out, "  {:<20}", row.title);
            for value in &row.values {
                out.push_str(&cell(*value));
            }
            let _ = writeln!(out, "   (n={})", row.samples);
        }
    }

    if !summary.files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Outputs:");
        for file in summary.files {
            let _ = writeln!(out, "  - {}", file.display());
        }
    }

    out
}

/// Print the report to stdout.
pub fn print_report(summary: &ReportSummary<'_>) {
    print!("{}", format_report(summary));
}
