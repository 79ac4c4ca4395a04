//! JourneyLens: patient journey completeness and sentiment analysis.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use journeylens_core::AnalysisConfig;
use journeylens_runtime::{AnalysisOutcome, Orchestrator};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod inspect;

const LOG_FILE: &str = "analysis.log";

fn resolve_data_dir(arg: Option<&String>) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| std::env::var("JOURNEYLENS_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Console plus `<logs_dir>/analysis.log`. Falls back to console only when
/// the log file cannot be opened.
fn init_tracing(logs_dir: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = logs_dir.join(LOG_FILE);

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .init();
            info!("Logging to {}", log_path.display());
        }
        Err(e) => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
            warn!("Cannot open {}: {}. Logging to console only.", log_path.display(), e);
        }
    }
}

fn print_help() {
    println!("JourneyLens: patient journey completeness and sentiment analysis");
    println!();
    println!("Usage: journeylens [command] [data-dir]");
    println!();
    println!("Commands:");
    println!("  analyze [data-dir]       Full pipeline: completeness, sentiment, topics (default)");
    println!("  score [data-dir]         Completeness scoring only");
    println!("  inspect [data-dir]       Show dataset structure and the first patient summary");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  JOURNEYLENS_DATA_DIR, JOURNEYLENS_OUTPUT_DIR, JOURNEYLENS_LOG_DIR");
    println!("  JOURNEYLENS_WORKERS, JOURNEYLENS_AMPLIFY_CONFIDENCE, JOURNEYLENS_PHASE_AVERAGING");
    println!("  JOURNEYLENS_NORMALIZE_TEXT, JOURNEYLENS_DEDUPE_PATIENTS");
    println!("  JOURNEYLENS_INFERENCE_URL, HF_API_TOKEN");
    println!("  JOURNEYLENS_SENTIMENT_MODEL, JOURNEYLENS_TOPIC_MODEL, JOURNEYLENS_CACHE_SIZE");
    println!("  RUST_LOG (default: info)");
}

fn print_outcome(outcome: &AnalysisOutcome) {
    let sentiment = outcome
        .nlp
        .as_ref()
        .map(journeylens_report::sentiment_heatmap);
    journeylens_report::print_report(&journeylens_report::ReportSummary {
        run: &outcome.run,
        completeness: &outcome.completeness,
        sentiment: sentiment.as_ref(),
        files: &outcome.files,
    });
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let (command, data_arg) = match args.get(1).map(String::as_str) {
        None => ("analyze", None),
        Some("--help" | "-h" | "help") => {
            print_help();
            return Ok(());
        }
        Some(cmd @ ("analyze" | "score" | "inspect")) => (cmd, args.get(2)),
        Some(other) => {
            eprintln!("Unknown command: {}. Use 'journeylens help' for usage.", other);
            std::process::exit(2);
        }
    };

    let data_dir = resolve_data_dir(data_arg);
    let config = AnalysisConfig::from_env(&data_dir)?;
    init_tracing(&config.data_paths.logs_dir);
    info!("Data directory: {}", data_dir.display());

    match command {
        "inspect" => inspect::run(&config)?,
        "score" => {
            let outcome = Orchestrator::new(config).run_scoring()?;
            print_outcome(&outcome);
        }
        _ => {
            let outcome = Orchestrator::new(config).run()?;
            print_outcome(&outcome);
            println!();
            println!("Analysis complete! Results saved in {}", outcome_dir(&outcome));
        }
    }

    Ok(())
}

fn outcome_dir(outcome: &AnalysisOutcome) -> String {
    outcome
        .files
        .first()
        .and_then(|f| f.parent())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "outputs".into())
}
