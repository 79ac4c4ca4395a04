//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_TOPIC_MODEL: &str = "facebook/bart-large-mnli";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Paths used by an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Input dataset directory (e.g., `data/`).
    pub data_dir: PathBuf,
    /// Output directory (`outputs/`).
    pub output_dir: PathBuf,
    /// Log directory (`logs/`).
    pub logs_dir: PathBuf,
    /// Raw results (`outputs/analysis_results.json`).
    pub results_file: PathBuf,
    /// Cleaned dataset (`outputs/cleaned_dataset.csv`).
    pub cleaned_dataset: PathBuf,
}

impl DataPaths {
    /// Create paths. Creates the output and log directories if needed; the
    /// data directory must already exist when loading.
    pub fn new(
        data_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        logs_dir: impl AsRef<Path>,
    ) -> std::io::Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        let paths = Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            logs_dir: logs_dir.as_ref().to_path_buf(),
            results_file: output_dir.join("analysis_results.json"),
            cleaned_dataset: output_dir.join("cleaned_dataset.csv"),
            output_dir,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        std::fs::create_dir_all(&self.logs_dir)?;
        Ok(())
    }
}

/// How cohort phase completeness is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseAveraging {
    /// Mean over every patient; absent phases contribute 0.0.
    #[default]
    Cohort,
    /// Mean over patients whose phase was evaluated.
    Evaluated,
}

impl std::str::FromStr for PhaseAveraging {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cohort" | "full" => Ok(Self::Cohort),
            "evaluated" => Ok(Self::Evaluated),
            other => Err(Error::Config(format!("unknown phase averaging mode: {}", other))),
        }
    }
}

/// Settings for the sentiment/topic inference backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of a hosted inference endpoint. `None` selects the offline lexicon backend.
    pub url: Option<String>,
    /// Bearer token for the hosted endpoint.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub sentiment_model: String,
    pub topic_model: String,
    pub timeout_secs: u64,
    /// Inference result cache capacity (0 disables caching).
    pub cache_size: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_token: None,
            sentiment_model: DEFAULT_SENTIMENT_MODEL.into(),
            topic_model: DEFAULT_TOPIC_MODEL.into(),
            timeout_secs: 30,
            cache_size: 1000,
        }
    }
}

/// Top-level analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub data_paths: DataPaths,
    /// Concurrent patients during enrichment (1 = sequential).
    pub workers: usize,
    /// Apply the confidence amplification stage to sentiment scores.
    pub amplify_confidence: bool,
    pub phase_averaging: PhaseAveraging,
    /// Strip markup and collapse whitespace in phase texts during cleaning.
    pub normalize_text: bool,
    /// Keep only the first row per patient id. Off by default: a patient may
    /// have one row per conversation.
    pub dedupe_patients: bool,
    pub inference: InferenceConfig,
}

impl AnalysisConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = std::env::var("JOURNEYLENS_OUTPUT_DIR").unwrap_or_else(|_| "outputs".into());
        let logs_dir = std::env::var("JOURNEYLENS_LOG_DIR").unwrap_or_else(|_| "logs".into());
        let data_paths = DataPaths::new(data_dir, output_dir, logs_dir)?;

        let workers = std::env::var("JOURNEYLENS_WORKERS")
            .ok()
            .and_then(|w| w.parse::<usize>().ok())
            .filter(|w| *w > 0)
            .unwrap_or(1);

        let phase_averaging = match std::env::var("JOURNEYLENS_PHASE_AVERAGING") {
            Ok(mode) => mode.parse()?,
            Err(_) => PhaseAveraging::default(),
        };

        let defaults = InferenceConfig::default();
        let inference = InferenceConfig {
            url: std::env::var("JOURNEYLENS_INFERENCE_URL").ok(),
            api_token: std::env::var("HF_API_TOKEN").ok(),
            sentiment_model: std::env::var("JOURNEYLENS_SENTIMENT_MODEL")
                .unwrap_or(defaults.sentiment_model),
            topic_model: std::env::var("JOURNEYLENS_TOPIC_MODEL").unwrap_or(defaults.topic_model),
            timeout_secs: std::env::var("JOURNEYLENS_INFERENCE_TIMEOUT")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            cache_size: std::env::var("JOURNEYLENS_CACHE_SIZE")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(defaults.cache_size),
        };

        Ok(Self {
            data_paths,
            workers,
            amplify_confidence: env_flag("JOURNEYLENS_AMPLIFY_CONFIDENCE", true),
            phase_averaging,
            normalize_text: env_flag("JOURNEYLENS_NORMALIZE_TEXT", false),
            dedupe_patients: env_flag("JOURNEYLENS_DEDUPE_PATIENTS", false),
            inference,
        })
    }

    /// Configuration with defaults rooted at explicit directories (no env lookups).
    pub fn with_paths(data_paths: DataPaths) -> Self {
        Self {
            data_paths,
            workers: 1,
            amplify_confidence: true,
            phase_averaging: PhaseAveraging::default(),
            normalize_text: false,
            dedupe_patients: false,
            inference: InferenceConfig::default(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => parse_flag(&v).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
