//! JSON persistence of results and chart summaries.

use std::fs;
use std::path::{Path, PathBuf};

use journeylens_core::Result;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::types::{AnalysisResults, CompletenessBars, Heatmap, RunMetadata};

pub const RESULTS_FILE: &str = "analysis_results.json";
pub const SENTIMENT_FILE: &str = "viz.sentiment.json";
pub const TOPICS_FILE: &str = "viz.topics.json";
pub const COMPLETENESS_FILE: &str = "viz.completeness.json";
pub const INDEX_FILE: &str = "viz.index.json";

/// Chart-ready summaries written alongside the raw results.
pub struct ChartSet<'a> {
    pub sentiment: Option<&'a Heatmap>,
    pub topics: Option<&'a Heatmap>,
    pub completeness: &'a CompletenessBars,
}

/// Writes run outputs into one directory.
pub struct ResultsWriter {
    output_dir: PathBuf,
}

impl ResultsWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `analysis_results.json` (pretty-printed).
    pub fn save_results(&self, results: &AnalysisResults<'_>) -> Result<PathBuf> {
        let path = self.output_dir.join(RESULTS_FILE);
        write_json(&path, results)?;
        info!("Results saved to {}", path.display());
        Ok(path)
    }

    /// Write each available chart summary plus an index listing them.
    pub fn write_charts(&self, charts: &ChartSet<'_>, run: &RunMetadata) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;
        let mut files: Vec<&str> = Vec::new();

        if let Some(sentiment) = charts.sentiment {
            write_json(self.output_dir.join(SENTIMENT_FILE), sentiment)?;
            files.push(SENTIMENT_FILE);
        }
        if let Some(topics) = charts.topics {
            write_json(self.output_dir.join(TOPICS_FILE), topics)?;
            files.push(TOPICS_FILE);
        }
        write_json(self.output_dir.join(COMPLETENESS_FILE), charts.completeness)?;
        files.push(COMPLETENESS_FILE);

        let index = json!({
            "run": run.id,
            "version": 1,
            "patients": run.patient_count,
            "files": files,
        });
        write_json(self.output_dir.join(INDEX_FILE), &index)?;

        info!("Wrote {} chart files to {}", files.len(), self.output_dir.display());
        let mut paths: Vec<PathBuf> = files.iter().map(|f| self.output_dir.join(f)).collect();
        paths.push(self.output_dir.join(INDEX_FILE));
        Ok(paths)
    }
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)?;
    Ok(())
}
