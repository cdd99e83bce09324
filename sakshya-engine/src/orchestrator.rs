//! Pairwise witness sweep
//!
//! One analysis is a linear pipeline: detect the batch language, extract
//! events for every witness concurrently, sweep the event cross-product of
//! every witness pair through the filter and comparator, refine findings,
//! and hand them to the report builder.

use crate::collaborators::Collaborators;
use crate::comparator::Comparator;
use crate::grouping::group_findings;
use chrono::Utc;
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use sakshya_core::{
    new_run_id, should_compare_events, AnalysisResponse, CollaboratorError, EngineSettings, Event,
    ExtractionFailurePolicy, ReportRow, RunId, SakshyaResult, Timestamp, ValidationError,
    WitnessInput,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::Instrument;

/// Counters for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    pub run_id: RunId,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub witnesses: usize,
    /// Unordered witness pairs, N(N-1)/2
    pub witness_pairs: usize,
    /// Event pairs across all witness pairs, before filtering
    pub candidate_pairs: usize,
    pub filtered_out: usize,
    pub compared: usize,
    pub findings: usize,
    pub extraction_failures: usize,
}

/// Every unordered pair of indices below `count`, in lexicographic order.
pub fn witness_pairs(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect()
}

struct Candidate<'a> {
    w1: &'a WitnessInput,
    w2: &'a WitnessInput,
    e1: &'a Event,
    e2: &'a Event,
}

/// Runs the cross-statement consistency sweep.
pub struct PairwiseOrchestrator {
    comparator: Comparator,
    collaborators: Collaborators,
    settings: EngineSettings,
}

impl PairwiseOrchestrator {
    pub fn new(
        comparator: Comparator,
        collaborators: Collaborators,
        settings: EngineSettings,
    ) -> Self {
        Self {
            comparator,
            collaborators,
            settings,
        }
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Analyze a batch of witness statements.
    ///
    /// # Errors
    /// * `ValidationError::DuplicateWitness` - two witnesses share an id
    /// * `CollaboratorError::Extraction` - extraction failed under
    ///   [`ExtractionFailurePolicy::FailFast`]
    pub async fn analyze(&self, witnesses: &[WitnessInput]) -> SakshyaResult<AnalysisResponse> {
        self.analyze_with_stats(witnesses)
            .await
            .map(|(response, _)| response)
    }

    /// Same as [`analyze`](Self::analyze), also returning run counters.
    pub async fn analyze_with_stats(
        &self,
        witnesses: &[WitnessInput],
    ) -> SakshyaResult<(AnalysisResponse, SweepStats)> {
        validate_witnesses(witnesses)?;

        let run_id = new_run_id();
        let span = tracing::info_span!("analysis", %run_id, witnesses = witnesses.len());
        self.run(run_id, witnesses).instrument(span).await
    }

    async fn run(
        &self,
        run_id: RunId,
        witnesses: &[WitnessInput],
    ) -> SakshyaResult<(AnalysisResponse, SweepStats)> {
        let mut stats = SweepStats {
            run_id,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            witnesses: witnesses.len(),
            witness_pairs: 0,
            candidate_pairs: 0,
            filtered_out: 0,
            compared: 0,
            findings: 0,
            extraction_failures: 0,
        };
        tracing::info!(
            backend = self.comparator.has_backend(),
            "Starting witness sweep"
        );

        let language = self.detect_language(witnesses).await;
        let events = self.extract_all(witnesses, &mut stats).await?;

        // Cross-product sweep
        let mut candidates = Vec::new();
        for (i, j) in witness_pairs(witnesses.len()) {
            stats.witness_pairs += 1;
            for e1 in &events[i] {
                for e2 in &events[j] {
                    stats.candidate_pairs += 1;
                    if !should_compare_events(e1, e2) {
                        stats.filtered_out += 1;
                        continue;
                    }
                    candidates.push(Candidate {
                        w1: &witnesses[i],
                        w2: &witnesses[j],
                        e1,
                        e2,
                    });
                }
            }
        }

        let concurrency = self.settings.comparison_concurrency.max(1);
        let results: Vec<_> = stream::iter(
            candidates
                .iter()
                .map(|c| self.comparator.compare(c.e1, c.e2)),
        )
        .buffered(concurrency)
        .collect()
        .await;

        let mut rows = Vec::new();
        for (candidate, result) in candidates.iter().zip(results) {
            stats.compared += 1;
            let mut row = self
                .collaborators
                .heuristics
                .score(result, candidate.e1, candidate.e2);
            row.source_1 = candidate.w1.source_label(candidate.e1);
            row.source_2 = candidate.w2.source_label(candidate.e2);

            if !row.classification.is_finding() {
                continue;
            }
            rows.push(self.refine(row, &language).await);
        }

        let rows = group_findings(rows);
        stats.findings = rows.len();
        let report = self.collaborators.report_builder.build(rows, &language);
        stats.finished_at = Utc::now();

        tracing::info!(
            witness_pairs = stats.witness_pairs,
            candidate_pairs = stats.candidate_pairs,
            filtered_out = stats.filtered_out,
            compared = stats.compared,
            findings = stats.findings,
            extraction_failures = stats.extraction_failures,
            "Witness sweep complete"
        );

        let response = AnalysisResponse {
            input_language: language.clone(),
            analysis_language: language,
            consolidated_report: report.rows,
            disclaimer: report.disclaimer,
        };
        Ok((response, stats))
    }

    async fn detect_language(&self, witnesses: &[WitnessInput]) -> String {
        let full_text = witnesses
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        match self.collaborators.linguist.detect_language(&full_text).await {
            Ok(language) => language,
            Err(e) => {
                let error = CollaboratorError::LanguageDetection {
                    reason: e.to_string(),
                };
                tracing::warn!(
                    %error,
                    fallback = %self.settings.fallback_language,
                    "Language detection failed"
                );
                self.settings.fallback_language.clone()
            }
        }
    }

    /// Extract events for every witness concurrently. The result is aligned
    /// with `witnesses` by index.
    async fn extract_all(
        &self,
        witnesses: &[WitnessInput],
        stats: &mut SweepStats,
    ) -> SakshyaResult<Vec<Vec<Event>>> {
        let extractor = &self.collaborators.extractor;
        let results = join_all(
            witnesses
                .iter()
                .map(|w| extractor.extract(&w.text, &w.witness_type)),
        )
        .await;

        let mut events = Vec::with_capacity(witnesses.len());
        for (witness, result) in witnesses.iter().zip(results) {
            match result {
                Ok(extracted) => {
                    tracing::debug!(witness_id = %witness.id, events = extracted.len(), "Extracted events");
                    events.push(extracted);
                }
                Err(e) => {
                    let error = CollaboratorError::Extraction {
                        witness_id: witness.id.clone(),
                        reason: e.to_string(),
                    };
                    match self.settings.extraction_failure_policy {
                        ExtractionFailurePolicy::FailFast => return Err(error.into()),
                        ExtractionFailurePolicy::DegradeToEmpty => {
                            tracing::warn!(%error, "Extraction failed, witness contributes no events");
                            stats.extraction_failures += 1;
                            events.push(Vec::new());
                        }
                    }
                }
            }
        }
        Ok(events)
    }

    async fn refine(&self, row: ReportRow, language: &str) -> ReportRow {
        match self
            .collaborators
            .linguist
            .refine(row.clone(), language)
            .await
        {
            Ok(refined) => refined,
            Err(e) => {
                let error = CollaboratorError::Refinement {
                    reason: e.to_string(),
                };
                tracing::warn!(%error, "Refinement failed, keeping unrefined row");
                row
            }
        }
    }
}

impl std::fmt::Debug for PairwiseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairwiseOrchestrator")
            .field("comparator", &self.comparator)
            .field("settings", &self.settings)
            .finish()
    }
}

fn validate_witnesses(witnesses: &[WitnessInput]) -> SakshyaResult<()> {
    let mut seen = HashSet::new();
    for witness in witnesses {
        if witness.id.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "witness.id".to_string(),
            }
            .into());
        }
        if !seen.insert(witness.id.as_str()) {
            return Err(ValidationError::DuplicateWitness {
                witness_id: witness.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

// ============================================================================
// UNIT TESTS
// ============================================================================
