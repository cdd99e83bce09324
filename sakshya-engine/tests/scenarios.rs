//! End-to-end witness scenarios driven through stub collaborators.

use proptest::prelude::*;
use sakshya_engine::{
    witness_pairs, Comparator, IDENTICAL_EVENTS_EXPLANATION, MALFORMED_RESPONSE_EXPLANATION,
    NO_BACKEND_EXPLANATION,
};
use sakshya_test_utils::assertions::{
    assert_consistent_fallback, assert_only_findings, assert_stats_balanced,
    assert_validation_error,
};
use sakshya_test_utils::fixtures::{
    contradiction_classifier, john_market_home, raju_noel_disjoint, raju_partial_name,
    CONTRADICTION_RESPONSE,
};
use sakshya_test_utils::{
    generators, init_test_tracing, stub_orchestrator, Classification, Event,
    InMemoryComparisonCache, MockClassifier, StubExtractor, WitnessInput, STUB_DISCLAIMER,
};
use std::sync::Arc;

#[tokio::test]
async fn john_market_home_offline_is_consistent() {
    init_test_tracing();
    let (witnesses, extractor) = john_market_home();
    let orch = stub_orchestrator(None, extractor);

    let (response, stats) = orch.analyze_with_stats(&witnesses).await.unwrap();
    assert!(response.consolidated_report.is_empty());
    assert_eq!(response.disclaimer, STUB_DISCLAIMER);
    assert_eq!(stats.compared, 1);
    assert_eq!(stats.findings, 0);
    assert_stats_balanced(&stats);
}

#[tokio::test]
async fn john_market_home_offline_comparison_explains_missing_backend() {
    let comparator = Comparator::new(None, Arc::new(InMemoryComparisonCache::new()));
    let result = comparator
        .compare(
            &Event::new("A1", "FIR", "John", "went to market").with_time("5 PM"),
            &Event::new("B1", "161", "John", "was at home").with_time("5 PM"),
        )
        .await;
    assert_consistent_fallback(&result, NO_BACKEND_EXPLANATION);
}

#[tokio::test]
async fn john_market_home_with_backend_is_contradiction() {
    init_test_tracing();
    let (witnesses, extractor) = john_market_home();
    let mock = contradiction_classifier();
    let orch = stub_orchestrator(Some(mock.clone()), extractor);

    let response = orch.analyze(&witnesses).await.unwrap();
    assert_only_findings(&response);
    assert_eq!(response.input_language, "en");
    assert_eq!(response.consolidated_report.len(), 1);

    let row = &response.consolidated_report[0];
    assert_eq!(row.classification, Classification::Contradiction);
    assert_eq!(row.severity, "high");
    assert_eq!(row.source_1, "Anitha (FIR): John went to market");
    assert_eq!(row.source_2, "Biju (161): John was at home");
    assert_eq!(
        row.explanation,
        "John cannot be at the market and at home at 5 PM."
    );
    assert_eq!(mock.calls(), 1);

    // Second run is served from the cache
    orch.analyze(&witnesses).await.unwrap();
    assert_eq!(mock.calls(), 1);
    assert_eq!(orch.comparator().cache().len(), 1);
}

#[tokio::test]
async fn raju_partial_name_reaches_comparison() {
    let (witnesses, extractor) = raju_partial_name();
    let mock = contradiction_classifier();
    let orch = stub_orchestrator(Some(mock.clone()), extractor);

    let (_, stats) = orch.analyze_with_stats(&witnesses).await.unwrap();
    assert_eq!(stats.filtered_out, 0);
    assert_eq!(stats.compared, 1);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn raju_noel_disjoint_makes_no_backend_calls() {
    let (witnesses, extractor) = raju_noel_disjoint();
    let mock = contradiction_classifier();
    let orch = stub_orchestrator(Some(mock.clone()), extractor);

    let (response, stats) = orch.analyze_with_stats(&witnesses).await.unwrap();
    assert!(response.consolidated_report.is_empty());
    assert_eq!(stats.candidate_pairs, 4);
    assert_eq!(stats.filtered_out, 4);
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn same_signature_pairs_share_one_verdict() {
    let a = WitnessInput::new("A", "Anitha", "FIR", "a");
    let b = WitnessInput::new("B", "Biju", "161", "b");
    let extractor = StubExtractor::new()
        .with(
            "a",
            vec![
                Event::new("A1", "FIR", "John", "went to market").with_time("5 PM"),
                Event::new("A2", "FIR", "john", "Went to market").with_location("Kochi"),
            ],
        )
        .with("b", vec![Event::new("B1", "161", "John", "was at home")]);
    let mock = MockClassifier::responding(CONTRADICTION_RESPONSE);
    let orch = stub_orchestrator(Some(mock.clone()), extractor);

    let response = orch.analyze(&[a, b]).await.unwrap();
    assert_eq!(mock.calls(), 1);
    let rows = &response.consolidated_report;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].classification, rows[1].classification);
    assert_eq!(rows[0].explanation, rows[1].explanation);
}

#[tokio::test]
async fn identical_fact_is_never_sent_to_backend() {
    let a = WitnessInput::new("A", "Anitha", "FIR", "a");
    let b = WitnessInput::new("B", "Biju", "161", "b");
    let extractor = StubExtractor::new()
        .with("a", vec![Event::new("A1", "FIR", "Raju", "stabbed").with_target("Noel")])
        .with("b", vec![Event::new("B1", "161", "RAJU", "stabbed").with_target("noel")]);
    let mock = contradiction_classifier();
    let orch = stub_orchestrator(Some(mock.clone()), extractor);

    let response = orch.analyze(&[a, b]).await.unwrap();
    assert!(response.consolidated_report.is_empty());
    assert_eq!(mock.calls(), 0);

    let result = orch
        .comparator()
        .compare(
            &Event::new("A1", "FIR", "Raju", "stabbed").with_target("Noel"),
            &Event::new("B1", "161", "RAJU", "stabbed").with_target("noel"),
        )
        .await;
    assert_consistent_fallback(&result, IDENTICAL_EVENTS_EXPLANATION);
}

#[tokio::test]
async fn malformed_backend_output_never_aborts_batch() {
    let (witnesses, extractor) = john_market_home();
    let mock = MockClassifier::responding("<html>502 Bad Gateway</html>");
    let orch = stub_orchestrator(Some(mock), extractor);

    let (response, stats) = orch.analyze_with_stats(&witnesses).await.unwrap();
    assert!(response.consolidated_report.is_empty());
    assert_eq!(stats.compared, 1);

    let result = orch
        .comparator()
        .compare(
            &Event::new("A1", "FIR", "John", "went to market"),
            &Event::new("B1", "161", "John", "was at home"),
        )
        .await;
    assert_consistent_fallback(&result, MALFORMED_RESPONSE_EXPLANATION);
}

#[tokio::test]
async fn duplicate_witness_ids_are_rejected() {
    let orch = stub_orchestrator(None, StubExtractor::new());
    let w = WitnessInput::new("A", "Anitha", "FIR", "a");
    assert_validation_error(&orch.analyze(&[w.clone(), w]).await);
}

#[tokio::test]
async fn empty_batch_yields_empty_report() {
    let orch = stub_orchestrator(None, StubExtractor::new());
    let (response, stats) = orch.analyze_with_stats(&[]).await.unwrap();
    assert!(response.consolidated_report.is_empty());
    assert_eq!(stats.witness_pairs, 0);
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// N witnesses produce exactly N(N-1)/2 witness pairs and the counters
    /// always balance.
    #[test]
    fn prop_sweep_visits_every_witness_pair_once(
        witnesses in generators::arb_witnesses(6),
        events in generators::arb_events("E", 3)
    ) {
        let extractor = witnesses.iter().fold(StubExtractor::new(), |ex, w| {
            ex.with(w.text.clone(), events.clone())
        });
        let orch = stub_orchestrator(None, extractor);
        let (response, stats) = runtime()
            .block_on(orch.analyze_with_stats(&witnesses))
            .unwrap();

        let n = witnesses.len();
        prop_assert_eq!(stats.witness_pairs, n * n.saturating_sub(1) / 2);
        prop_assert_eq!(witness_pairs(n).len(), stats.witness_pairs);
        prop_assert_eq!(stats.candidate_pairs, stats.witness_pairs * events.len() * events.len());
        prop_assert_eq!(stats.candidate_pairs, stats.filtered_out + stats.compared);
        // Offline mode never reports a finding
        prop_assert!(response.consolidated_report.is_empty());
    }
}
