//! SAKSHYA Test Utilities
//!
//! Shared test infrastructure for the SAKSHYA workspace:
//! - Stub collaborators for driving the orchestrator
//! - Proptest generators for events and witnesses
//! - Fixtures for the common witness scenarios
//! - Custom assertions for reports and results

// Re-export core types for convenience
pub use sakshya_core::{
    AnalysisResponse, Classification, CollaboratorError, ComparisonResult, ConsolidatedReport,
    EngineSettings, Event, ExtractionFailurePolicy, LlmError, ReportRow, SakshyaConfig,
    SakshyaError, SakshyaResult, ValidationError, Verdict, WitnessInput,
};
pub use sakshya_engine::{
    Collaborators, Comparator, Extractor, HeuristicsEngine, Linguist, PairwiseOrchestrator,
    ReportBuilder, SweepStats,
};
pub use sakshya_llm::{Classifier, ComparisonCache, InMemoryComparisonCache, MockClassifier};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

// ============================================================================
// STUB COLLABORATORS
// ============================================================================

/// Extractor answering from a fixed table keyed by statement text.
/// Texts not in the table fail extraction.
#[derive(Debug, Clone, Default)]
pub struct StubExtractor {
    events: HashMap<String, Vec<Event>>,
    calls: Arc<AtomicUsize>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the events extracted from `text`.
    pub fn with(mut self, text: impl Into<String>, events: Vec<Event>) -> Self {
        self.events.insert(text.into(), events);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, text: &str, _statement_type: &str) -> SakshyaResult<Vec<Event>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.get(text).cloned().ok_or_else(|| {
            LlmError::InvalidResponse {
                provider: "stub-extractor".to_string(),
                reason: format!("no events registered for {text:?}"),
            }
            .into()
        })
    }
}

/// Heuristics that copy the verdict through and derive severity from the
/// classification alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughHeuristics;

impl PassThroughHeuristics {
    pub fn severity(classification: Classification) -> &'static str {
        match classification {
            Classification::Contradiction => "high",
            Classification::Omission => "medium",
            Classification::MinorDiscrepancy => "low",
            Classification::Consistent => "none",
        }
    }
}

impl HeuristicsEngine for PassThroughHeuristics {
    fn score(&self, result: ComparisonResult, _e1: &Event, _e2: &Event) -> ReportRow {
        ReportRow {
            source_1: result.event_1_id,
            source_2: result.event_2_id,
            classification: result.classification,
            severity: Self::severity(result.classification).to_string(),
            explanation: result.explanation,
        }
    }
}

/// Linguist that reports a fixed language and leaves explanations as-is.
#[derive(Debug, Clone)]
pub struct EchoLinguist {
    language: Option<String>,
    refine_fails: bool,
    refinements: Arc<AtomicUsize>,
}

impl EchoLinguist {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            refine_fails: false,
            refinements: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A linguist whose language detection always fails.
    pub fn undetectable() -> Self {
        Self {
            language: None,
            ..Self::new("")
        }
    }

    /// Make every refinement call fail.
    pub fn failing_refinement(mut self) -> Self {
        self.refine_fails = true;
        self
    }

    pub fn refinements(&self) -> usize {
        self.refinements.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Linguist for EchoLinguist {
    async fn detect_language(&self, _text: &str) -> SakshyaResult<String> {
        self.language
            .clone()
            .ok_or_else(|| LlmError::ProviderNotConfigured.into())
    }

    async fn refine(&self, row: ReportRow, _language: &str) -> SakshyaResult<ReportRow> {
        self.refinements.fetch_add(1, Ordering::SeqCst);
        if self.refine_fails {
            return Err(LlmError::ProviderNotConfigured.into());
        }
        Ok(row)
    }
}

pub const STUB_DISCLAIMER: &str = "Automated analysis. Verify against the original statements.";

/// Report builder that keeps rows unchanged with a fixed disclaimer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleReportBuilder;

impl ReportBuilder for SimpleReportBuilder {
    fn build(&self, rows: Vec<ReportRow>, _language: &str) -> ConsolidatedReport {
        ConsolidatedReport {
            rows,
            disclaimer: STUB_DISCLAIMER.to_string(),
        }
    }
}

/// Default stub collaborators around the given extractor.
pub fn stub_collaborators(extractor: StubExtractor) -> Collaborators {
    Collaborators {
        extractor: Arc::new(extractor),
        heuristics: Arc::new(PassThroughHeuristics),
        linguist: Arc::new(EchoLinguist::new("en")),
        report_builder: Arc::new(SimpleReportBuilder),
    }
}

/// Orchestrator with stub collaborators, a private cache, and the given
/// backend. `None` runs offline.
pub fn stub_orchestrator(
    classifier: Option<MockClassifier>,
    extractor: StubExtractor,
) -> PairwiseOrchestrator {
    let classifier = classifier.map(|c| Arc::new(c) as Arc<dyn Classifier>);
    PairwiseOrchestrator::new(
        Comparator::new(classifier, Arc::new(InMemoryComparisonCache::new())),
        stub_collaborators(extractor),
        EngineSettings::default(),
    )
}

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test-writer subscriber honouring `RUST_LOG`. Safe to call
/// from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for SAKSHYA entities.

    use super::*;
    use proptest::prelude::*;
    use sakshya_core::filter::GENERIC_ACTORS;

    /// Generate a Classification variant.
    pub fn arb_classification() -> impl Strategy<Value = Classification> {
        prop_oneof![
            Just(Classification::Consistent),
            Just(Classification::Contradiction),
            Just(Classification::Omission),
            Just(Classification::MinorDiscrepancy),
        ]
    }

    /// A short proper name, one or two tokens.
    pub fn arb_name() -> impl Strategy<Value = String> {
        ("[A-Z][a-z]{2,7}", proptest::option::of("[A-Z][a-z]{2,7}")).prop_map(|(first, last)| {
            match last {
                Some(last) => format!("{first} {last}"),
                None => first,
            }
        })
    }

    /// One of the generic references.
    pub fn arb_generic_actor() -> impl Strategy<Value = String> {
        proptest::sample::select(GENERIC_ACTORS.to_vec()).prop_map(str::to_string)
    }

    pub fn arb_actor() -> impl Strategy<Value = String> {
        prop_oneof![3 => arb_name(), 1 => arb_generic_actor()]
    }

    pub fn arb_action() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("went to market".to_string()),
            Just("was at home".to_string()),
            Just("stabbed".to_string()),
            Just("ran away".to_string()),
            Just("shouted".to_string()),
            "[a-z]{3,8}( [a-z]{2,6}){0,2}",
        ]
    }

    /// Generate an Event with the given id.
    pub fn arb_event(event_id: String) -> impl Strategy<Value = Event> {
        (
            arb_actor(),
            arb_action(),
            proptest::option::of(arb_name()),
            proptest::option::of(prop_oneof![
                Just("5 PM".to_string()),
                Just("9 PM".to_string()),
                Just("morning".to_string()),
            ]),
            proptest::option::of("[A-Z][a-z]{3,8}"),
        )
            .prop_map(move |(actor, action, target, time, location)| Event {
                event_id: event_id.clone(),
                statement_type: "FIR".to_string(),
                actor,
                action,
                target,
                time,
                location,
                source_sentence: String::new(),
            })
    }

    /// Generate up to `max` events with ids `<prefix>1..`.
    pub fn arb_events(prefix: &'static str, max: usize) -> impl Strategy<Value = Vec<Event>> {
        (0..=max).prop_flat_map(move |n| {
            (1..=n)
                .map(|i| arb_event(format!("{prefix}{i}")))
                .collect::<Vec<_>>()
        })
    }

    /// Generate a witness with a unique text derived from its id.
    pub fn arb_witness(id: usize) -> impl Strategy<Value = WitnessInput> {
        (
            arb_name(),
            prop_oneof![Just("FIR".to_string()), Just("161".to_string()), Just("164".to_string())],
        )
            .prop_map(move |(name, witness_type)| {
                WitnessInput::new(id.to_string(), name, witness_type, format!("statement {id}"))
            })
    }

    /// Generate 0..=max witnesses with distinct ids.
    pub fn arb_witnesses(max: usize) -> impl Strategy<Value = Vec<WitnessInput>> {
        (0..=max).prop_flat_map(|n| (0..n).map(arb_witness).collect::<Vec<_>>())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built witness scenarios.

    use super::*;

    pub const CONTRADICTION_RESPONSE: &str = r#"{"classification":"contradiction","explanation":"John cannot be at the market and at home at 5 PM."}"#;

    /// Backend stub that always reports a contradiction.
    pub fn contradiction_classifier() -> MockClassifier {
        MockClassifier::responding(CONTRADICTION_RESPONSE)
    }

    pub fn witness(id: &str, name: &str, witness_type: &str) -> WitnessInput {
        WitnessInput::new(id, name, witness_type, format!("statement of {name}"))
    }

    /// Two witnesses placing John in different places at 5 PM.
    pub fn john_market_home() -> (Vec<WitnessInput>, StubExtractor) {
        let a = witness("A", "Anitha", "FIR");
        let b = witness("B", "Biju", "161");
        let extractor = StubExtractor::new()
            .with(
                a.text.clone(),
                vec![Event::new("A1", "FIR", "John", "went to market").with_time("5 PM")],
            )
            .with(
                b.text.clone(),
                vec![Event::new("B1", "161", "John", "was at home").with_time("5 PM")],
            );
        (vec![a, b], extractor)
    }

    /// Two witnesses naming the same person with and without a surname.
    pub fn raju_partial_name() -> (Vec<WitnessInput>, StubExtractor) {
        let a = witness("A", "Suresh", "FIR");
        let b = witness("B", "Meena", "161");
        let extractor = StubExtractor::new()
            .with(
                a.text.clone(),
                vec![Event::new("A1", "FIR", "Raju", "stabbed").with_target("Noel")],
            )
            .with(
                b.text.clone(),
                vec![Event::new("B1", "161", "Raju Kumar", "hit").with_target("Noel")],
            );
        (vec![a, b], extractor)
    }

    /// Two witnesses describing different people entirely.
    pub fn raju_noel_disjoint() -> (Vec<WitnessInput>, StubExtractor) {
        let a = witness("A", "Suresh", "FIR");
        let b = witness("B", "Meena", "161");
        let extractor = StubExtractor::new()
            .with(
                a.text.clone(),
                vec![
                    Event::new("A1", "FIR", "Raju", "stabbed"),
                    Event::new("A2", "FIR", "Raju", "ran away"),
                ],
            )
            .with(
                b.text.clone(),
                vec![
                    Event::new("B1", "161", "Noel", "fell down"),
                    Event::new("B2", "161", "Noel", "was bleeding"),
                ],
            );
        (vec![a, b], extractor)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for SAKSHYA results.

    use super::*;

    /// Assert that no row in the response is a consistent classification.
    #[track_caller]
    pub fn assert_only_findings(response: &AnalysisResponse) {
        for row in &response.consolidated_report {
            assert!(
                row.classification.is_finding(),
                "Consistent row leaked into report: {:?}",
                row
            );
        }
    }

    /// Assert that a result is the safety fallback with the given explanation.
    #[track_caller]
    pub fn assert_consistent_fallback(result: &ComparisonResult, explanation: &str) {
        assert_eq!(result.classification, Classification::Consistent);
        assert_eq!(result.explanation, explanation);
    }

    /// Assert that a SakshyaResult is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &SakshyaResult<T>) {
        match result {
            Err(SakshyaError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert the sweep counters add up.
    #[track_caller]
    pub fn assert_stats_balanced(stats: &SweepStats) {
        assert_eq!(
            stats.witness_pairs,
            stats.witnesses * stats.witnesses.saturating_sub(1) / 2
        );
        assert_eq!(stats.candidate_pairs, stats.filtered_out + stats.compared);
        assert!(stats.findings <= stats.compared);
        assert!(stats.finished_at >= stats.started_at);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_stub_extractor_known_and_unknown() {
        let extractor = StubExtractor::new().with("text", vec![Event::new("A1", "FIR", "x", "y")]);
        assert_eq!(extractor.extract("text", "FIR").await.unwrap().len(), 1);
        assert!(extractor.extract("other", "FIR").await.is_err());
        assert_eq!(extractor.calls(), 2);
    }

    #[test]
    fn test_passthrough_heuristics_keeps_verdict() {
        let result = ComparisonResult {
            event_1_id: "A1".to_string(),
            event_2_id: "B1".to_string(),
            classification: Classification::Omission,
            explanation: "missing".to_string(),
        };
        let e = Event::new("A1", "FIR", "x", "y");
        let row = PassThroughHeuristics.score(result, &e, &e);
        assert_eq!(row.classification, Classification::Omission);
        assert_eq!(row.severity, "medium");
        assert_eq!(row.explanation, "missing");
    }

    #[tokio::test]
    async fn test_echo_linguist() {
        let linguist = EchoLinguist::new("ml");
        assert_eq!(linguist.detect_language("x").await.unwrap(), "ml");
        assert!(EchoLinguist::undetectable().detect_language("x").await.is_err());
    }

    #[test]
    fn test_fixture_witnesses_are_distinct() {
        let (witnesses, _) = fixtures::john_market_home();
        assert_ne!(witnesses[0].id, witnesses[1].id);
        assert_ne!(witnesses[0].text, witnesses[1].text);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_witness_ids_unique(witnesses in generators::arb_witnesses(6)) {
            let mut ids: Vec<_> = witnesses.iter().map(|w| w.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), witnesses.len());
        }

        #[test]
        fn prop_generated_events_have_prefixed_ids(events in generators::arb_events("A", 5)) {
            for (i, event) in events.iter().enumerate() {
                prop_assert_eq!(&event.event_id, &format!("A{}", i + 1));
                prop_assert!(!event.actor.is_empty());
            }
        }
    }
}
