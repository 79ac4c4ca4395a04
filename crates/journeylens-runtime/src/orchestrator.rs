//! Orchestrator: runs pipeline verbs within a concurrency budget.

use std::path::PathBuf;

use journeylens_core::{AnalysisConfig, Error, PatientRecord, Result};
use journeylens_enrich::{CohortNlpResult, ConfidenceAmplifier, NlpEnricher};
use journeylens_infer::{create_backends, Backends};
use journeylens_ingest::{write_cleaned_csv, Cleaner, DataLoader};
use journeylens_metrics::{calculate_phase_completeness, CohortCompleteness};
use journeylens_report::{
    completeness_bars, sentiment_heatmap, topic_heatmap, AnalysisResults, ChartSet, ResultsWriter, RunMetadata,
};
use tracing::{debug, info};

use crate::types::*;

/// Top-level orchestrator that coordinates the pipeline verbs.
///
/// Verbs are synchronous. Concurrent enrichment builds its own runtime, so
/// the orchestrator must not be driven from inside an async context.
pub struct Orchestrator {
    config: AnalysisConfig,
    backends: Backends,
    budget: ResourceBudget,
}

impl Orchestrator {
    /// Create an orchestrator with the best available inference backends.
    pub fn new(config: AnalysisConfig) -> Self {
        let backends = create_backends(&config.inference);
        Self::with_backends(config, backends)
    }

    /// Create with explicit backends (for testing).
    pub fn with_backends(config: AnalysisConfig, backends: Backends) -> Self {
        let budget = ResourceBudget::for_workers(config.workers);
        info!(
            "Orchestrator initialized: workers={}, sentiment={}, topics={}",
            budget.max_concurrency,
            backends.sentiment.name(),
            backends.topics.name()
        );
        Self {
            config,
            backends,
            budget,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn budget(&self) -> &ResourceBudget {
        &self.budget
    }

    fn enricher(&self) -> NlpEnricher {
        NlpEnricher::from_backends(&self.backends, ConfidenceAmplifier::new(self.config.amplify_confidence))
    }

    /// Verb ingest: load → clean → write `cleaned_dataset.csv`.
    pub fn ingest(&self) -> Result<IngestOutcome> {
        debug!("Verb {} starting", Verb::Ingest.as_str());
        let paths = &self.config.data_paths;
        let dataset = DataLoader::new(&paths.data_dir).load()?;
        let (records, report) = Cleaner::new(self.config.normalize_text)
            .with_dedupe(self.config.dedupe_patients)
            .clean(&dataset);
        write_cleaned_csv(&records, &paths.cleaned_dataset)?;

        Ok(IngestOutcome {
            source: dataset.source,
            records,
            report,
        })
    }

    /// Verb score: cohort completeness. Fails on an empty cohort.
    pub fn score(&self, records: &[PatientRecord]) -> Result<CohortCompleteness> {
        debug!("Verb {} starting", Verb::Score.as_str());
        calculate_phase_completeness(records.iter().map(|r| &r.summary), self.config.phase_averaging)
    }

    /// Verb enrich: sentiment and topics per phase, in patient order.
    ///
    /// Runs sequentially with a budget of one worker; otherwise patients are
    /// spread over a bounded blocking pool.
    pub fn enrich(&self, records: &[PatientRecord]) -> Result<CohortNlpResult> {
        debug!("Verb {} starting", Verb::Enrich.as_str());
        let enricher = self.enricher();

        if self.budget.is_sequential() {
            return Ok(enricher.analyze_cohort(records.iter().map(|r| &r.summary)));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.budget.driver_threads)
            .max_blocking_threads(self.budget.max_concurrency)
            .thread_name("journeylens-enrich")
            .enable_all()
            .build()
            .map_err(|e| Error::Internal(format!("failed to start worker pool: {}", e)))?;

        let summaries = records.iter().map(|r| r.summary.clone()).collect();
        runtime.block_on(enricher.analyze_cohort_concurrent(summaries, self.budget.max_concurrency))
    }

    /// Verb report: write results JSON (when enrichment ran) and charts.
    pub fn report(
        &self,
        run: &RunMetadata,
        completeness: &CohortCompleteness,
        nlp: Option<&CohortNlpResult>,
    ) -> Result<Vec<PathBuf>> {
        debug!("Verb {} starting", Verb::Report.as_str());
        let writer = ResultsWriter::new(&self.config.data_paths.output_dir);
        let mut files = Vec::new();

        let bars = completeness_bars(completeness);
        let (sentiment, topics) = match nlp {
            Some(nlp) => {
                files.push(writer.save_results(&AnalysisResults::new(nlp, completeness, run))?);
                (Some(sentiment_heatmap(nlp)), Some(topic_heatmap(nlp)))
            }
            None => (None, None),
        };

        let charts = ChartSet {
            sentiment: sentiment.as_ref(),
            topics: topics.as_ref(),
            completeness: &bars,
        };
        files.extend(writer.write_charts(&charts, run)?);
        Ok(files)
    }

    /// Full pipeline: ingest → score → enrich → report.
    pub fn run(&self) -> Result<AnalysisOutcome> {
        self.execute(true)
    }

    /// Ingest → score → report, without enrichment.
    pub fn run_scoring(&self) -> Result<AnalysisOutcome> {
        self.execute(false)
    }

    fn execute(&self, with_nlp: bool) -> Result<AnalysisOutcome> {
        let mut run = RunMetadata::start(self.config.phase_averaging, self.budget.max_concurrency);
        info!("Analysis run {} started", run.id);

        let ingest = self.ingest()?;
        run.source = Some(ingest.source.display().to_string());
        run.patient_count = ingest.records.len();

        let completeness = self.score(&ingest.records)?;

        let nlp = if with_nlp {
            run.sentiment_backend = Some(self.backends.sentiment.name().to_string());
            run.topic_backend = Some(self.backends.topics.name().to_string());
            run.amplification = Some(ConfidenceAmplifier::new(self.config.amplify_confidence));
            Some(self.enrich(&ingest.records)?)
        } else {
            None
        };

        run.finish();
        let files = self.report(&run, &completeness, nlp.as_ref())?;
        info!(
            "Analysis run {} complete: {} patients in {} ms",
            run.id,
            run.patient_count,
            run.duration_ms().unwrap_or(0)
        );

        Ok(AnalysisOutcome {
            run,
            ingest: ingest.report,
            completeness,
            nlp,
            files,
        })
    }
}
