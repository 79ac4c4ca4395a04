//! NLP enrichment engine: sentiment and topics for every resolved phase.
//!
//! Each patient is resolved independently of the completeness scorer. For
//! every present phase the sentiment and topic capabilities are called as two
//! separate units: either may fail without affecting the other, and a failure
//! only replaces that one result with its fallback.

use std::sync::Arc;

use journeylens_core::taxonomy::TOPICS;
use journeylens_core::{Error, RawPhaseMap, Result, TaxonomyPhase};
use journeylens_infer::{Backends, SentimentBackend, SentimentResult, TopicBackend, TopicResult};
use journeylens_resolve::PhaseResolver;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::postprocess::ConfidenceAmplifier;
use crate::types::{CohortNlpResult, PatientNlp};

/// Patients between progress log lines.
const PROGRESS_INTERVAL: usize = 100;

/// Replace a failed inference call with its fallback value.
fn or_fallback<T>(
    result: Result<T>,
    fallback: fn() -> T,
    capability: &str,
    phase: TaxonomyPhase,
    failures: &mut usize,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!("{} failed for {}: {}. Using fallback.", capability, phase, e);
            *failures += 1;
            fallback()
        }
    }
}

/// Per-phase sentiment/topic enrichment over pluggable backends.
#[derive(Clone)]
pub struct NlpEnricher {
    sentiment: Arc<dyn SentimentBackend>,
    topics: Arc<dyn TopicBackend>,
    amplifier: ConfidenceAmplifier,
}

impl NlpEnricher {
    pub fn new(
        sentiment: Arc<dyn SentimentBackend>,
        topics: Arc<dyn TopicBackend>,
        amplifier: ConfidenceAmplifier,
    ) -> Self {
        Self {
            sentiment,
            topics,
            amplifier,
        }
    }

    pub fn from_backends(backends: &Backends, amplifier: ConfidenceAmplifier) -> Self {
        Self::new(backends.sentiment.clone(), backends.topics.clone(), amplifier)
    }

    pub fn amplifier(&self) -> &ConfidenceAmplifier {
        &self.amplifier
    }

    /// Sentiment and topics for every taxonomy phase of one patient.
    ///
    /// Phases not resolved present keep their fallback values.
    pub fn analyze_patient(&self, raw: &RawPhaseMap) -> PatientNlp {
        let mut nlp = PatientNlp::fallback();
        let journey = PhaseResolver::resolve(raw);

        for (phase, text) in journey.present() {
            let sentiment = or_fallback(
                self.sentiment
                    .classify_sentiment(text)
                    .map(|s| self.amplifier.apply(s)),
                SentimentResult::fallback,
                "Sentiment",
                phase,
                &mut nlp.failures,
            );
            nlp.sentiment.insert(phase, sentiment);

            let topics = or_fallback(
                self.topics.classify_topics(text, &TOPICS),
                TopicResult::fallback,
                "Topic classification",
                phase,
                &mut nlp.failures,
            );
            nlp.topics.insert(phase, topics);
        }

        nlp
    }

    /// Analyze every patient sequentially, in input order.
    pub fn analyze_cohort<'a, I>(&self, patients: I) -> CohortNlpResult
    where
        I: IntoIterator<Item = &'a RawPhaseMap>,
    {
        let mut cohort = CohortNlpResult::new();
        for raw in patients {
            cohort.push(self.analyze_patient(raw));
            if cohort.patient_count % PROGRESS_INTERVAL == 0 {
                info!("Enrichment: {} patients analyzed", cohort.patient_count);
            }
        }
        log_summary(&cohort);
        cohort
    }

    /// Analyze patients on up to `workers` blocking threads at once.
    ///
    /// Each patient's result lands in the slot for its input index, and the
    /// slots are merged in order, so the output equals `analyze_cohort`.
    pub async fn analyze_cohort_concurrent(
        &self,
        patients: Vec<RawPhaseMap>,
        workers: usize,
    ) -> Result<CohortNlpResult> {
        let total = patients.len();
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let mut tasks = JoinSet::new();

        info!("Enriching {} patients with {} workers", total, workers.max(1));

        for (index, raw) in patients.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(format!("worker pool closed: {}", e)))?;
            let enricher = self.clone();
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, enricher.analyze_patient(&raw))
            });
        }

        let mut slots: Vec<Option<PatientNlp>> = vec![None; total];
        let mut done = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (index, nlp) =
                joined.map_err(|e| Error::Internal(format!("enrichment task failed: {}", e)))?;
            slots[index] = Some(nlp);
            done += 1;
            if done % PROGRESS_INTERVAL == 0 {
                info!("Enrichment: {}/{} patients analyzed", done, total);
            }
        }

        let mut cohort = CohortNlpResult::new();
        for (index, slot) in slots.into_iter().enumerate() {
            let nlp = slot.ok_or_else(|| Error::Internal(format!("no result for patient {}", index)))?;
            cohort.push(nlp);
        }
        log_summary(&cohort);
        Ok(cohort)
    }
}

fn log_summary(cohort: &CohortNlpResult) {
    info!("Enrichment complete: {} patients", cohort.patient_count);
    if cohort.inference_failures > 0 {
        warn!(
            "{} inference calls failed and were replaced by fallback values",
            cohort.inference_failures
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeylens_infer::{LexiconBackend, SentimentLabel, UnavailableBackend};

    /// Returns a fixed score, or fails on texts containing "fail".
    struct StubSentiment(f64);

    impl SentimentBackend for StubSentiment {
        fn classify_sentiment(&self, text: &str) -> Result<SentimentResult> {
            if text.contains("fail") {
                return Err(Error::Inference("stub failure".into()));
            }
            Ok(SentimentResult::new(SentimentLabel::Positive, self.0))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Scores the first candidate by text length so results differ per patient.
    struct StubTopics;

    impl TopicBackend for StubTopics {
        fn classify_topics(&self, text: &str, candidates: &[&str]) -> Result<TopicResult> {
            let mut scores = vec![0.0; candidates.len()];
            if let Some(first) = scores.first_mut() {
                *first = (text.len() as f64 / 100.0).min(1.0);
            }
            Ok(TopicResult {
                labels: candidates.iter().map(|c| c.to_string()).collect(),
                scores,
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn stub_enricher(score: f64, amplifier: ConfidenceAmplifier) -> NlpEnricher {
        NlpEnricher::new(Arc::new(StubSentiment(score)), Arc::new(StubTopics), amplifier)
    }

    fn patient(pairs: &[(&str, &str)]) -> RawPhaseMap {
        RawPhaseMap::from_pairs(pairs.iter().map(|(k, v)| (*k, Some(*v))))
    }

    #[test]
    fn test_absent_phases_return_exact_fallback() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        let nlp = enricher.analyze_patient(&patient(&[("early_symptoms_phase", "Headaches")]));

        assert_eq!(nlp.sentiment.len(), TaxonomyPhase::COUNT);
        assert_eq!(nlp.topics.len(), TaxonomyPhase::COUNT);
        for phase in TaxonomyPhase::ALL {
            if phase == TaxonomyPhase::SymptomOnset {
                continue;
            }
            assert_eq!(nlp.sentiment[&phase], SentimentResult::fallback());
            assert_eq!(nlp.topics[&phase], TopicResult::fallback());
        }
        assert!(!nlp.sentiment[&TaxonomyPhase::SymptomOnset].is_fallback());
    }

    #[test]
    fn test_empty_patient_is_all_fallback() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        assert_eq!(enricher.analyze_patient(&RawPhaseMap::default()), PatientNlp::fallback());
    }

    #[test]
    fn test_secondary_phase_uses_parent_text() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        let nlp = enricher.analyze_patient(&patient(&[("diagnosis", "Patient decided to proceed with treatment")]));
        assert!(!nlp.sentiment[&TaxonomyPhase::Decision].is_fallback());
        assert_eq!(
            nlp.topics[&TaxonomyPhase::Decision],
            nlp.topics[&TaxonomyPhase::PrimaryDiagnostic]
        );

        let nlp = enricher.analyze_patient(&patient(&[("diagnosis", "Normal symptoms description")]));
        assert!(nlp.sentiment[&TaxonomyPhase::Decision].is_fallback());
        assert!(nlp.topics[&TaxonomyPhase::Decision].is_fallback());
    }

    #[test]
    fn test_sentiment_failure_does_not_affect_topics() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        let nlp = enricher.analyze_patient(&patient(&[
            ("early_symptoms_phase", "this will fail"),
            ("ongoing_care", "Weekly physiotherapy"),
        ]));

        assert!(nlp.sentiment[&TaxonomyPhase::SymptomOnset].is_fallback());
        assert!(!nlp.topics[&TaxonomyPhase::SymptomOnset].is_fallback());
        assert!(!nlp.sentiment[&TaxonomyPhase::OngoingCare].is_fallback());
        assert_eq!(nlp.failures, 1);
    }

    #[test]
    fn test_topic_failure_does_not_affect_sentiment() {
        let enricher = NlpEnricher::new(
            Arc::new(StubSentiment(0.7)),
            Arc::new(UnavailableBackend::new("offline")),
            ConfidenceAmplifier::default(),
        );
        let nlp = enricher.analyze_patient(&patient(&[("treatment", "Chemotherapy")]));
        assert_eq!(nlp.sentiment[&TaxonomyPhase::NewTreatment].score, 0.9);
        assert_eq!(nlp.topics[&TaxonomyPhase::NewTreatment], TopicResult::fallback());
    }

    #[test]
    fn test_amplification_toggle() {
        let raw = patient(&[("treatment", "Chemotherapy")]);
        let on = stub_enricher(0.65, ConfidenceAmplifier::default()).analyze_patient(&raw);
        let off = stub_enricher(0.65, ConfidenceAmplifier::disabled()).analyze_patient(&raw);
        assert_eq!(on.sentiment[&TaxonomyPhase::NewTreatment].score, 0.9);
        assert_eq!(off.sentiment[&TaxonomyPhase::NewTreatment].score, 0.65);
    }

    #[test]
    fn test_unavailable_backends_never_abort() {
        let enricher = NlpEnricher::from_backends(&Backends::unavailable("no model"), ConfidenceAmplifier::default());
        let patients = vec![
            patient(&[("diagnosis", "We decided on surgery"), ("treatment", "Follow-up review")]),
            patient(&[("ongoing_care", "Monthly checks")]),
        ];
        let cohort = enricher.analyze_cohort(&patients);
        assert_eq!(cohort.patient_count, 2);
        for phase in TaxonomyPhase::ALL {
            assert_eq!(cohort.sentiment(phase).len(), 2);
            assert!(cohort.sentiment(phase).iter().all(SentimentResult::is_fallback));
            assert!(cohort.topics(phase).iter().all(TopicResult::is_fallback));
        }
        // Two present primaries + two secondaries, then one primary; two calls each
        assert_eq!(cohort.inference_failures, 10);
    }

    #[test]
    fn test_cohort_preserves_patient_order() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        let patients = vec![
            patient(&[("ongoing_care", "short")]),
            RawPhaseMap::default(),
            patient(&[("ongoing_care", "a considerably longer ongoing care note")]),
        ];
        let cohort = enricher.analyze_cohort(&patients);
        let care = cohort.topics(TaxonomyPhase::OngoingCare);
        assert_eq!(care.len(), 3);
        assert_eq!(care[0].scores[0], 0.05);
        assert!(care[1].is_fallback());
        assert!(care[2].scores[0] > care[0].scores[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_matches_sequential() {
        let enricher = NlpEnricher::new(
            Arc::new(LexiconBackend::new()),
            Arc::new(LexiconBackend::new()),
            ConfidenceAmplifier::default(),
        );
        let patients: Vec<RawPhaseMap> = (0..40)
            .map(|i| {
                let text = format!("Patient {} felt worried about pain{}", i, " and fatigue".repeat(i % 4));
                if i % 3 == 0 {
                    RawPhaseMap::default()
                } else {
                    patient(&[("early_symptoms_phase", text.as_str()), ("treatment", "Follow up review, happy")])
                }
            })
            .collect();

        let sequential = enricher.analyze_cohort(&patients);
        let concurrent = enricher.analyze_cohort_concurrent(patients, 4).await.unwrap();
        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_concurrent_empty_cohort() {
        let enricher = stub_enricher(0.8, ConfidenceAmplifier::default());
        let cohort = enricher.analyze_cohort_concurrent(Vec::new(), 4).await.unwrap();
        assert_eq!(cohort.patient_count, 0);
        assert!(cohort.sentiment(TaxonomyPhase::Decision).is_empty());
    }
}
