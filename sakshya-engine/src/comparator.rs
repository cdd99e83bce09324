//! Cache-backed event pair comparison
//!
//! [`Comparator::compare`] never fails. Every error path folds into a
//! consistent verdict with an explanation naming what went wrong, so an
//! inconclusive comparison can never manufacture a contradiction and one bad
//! pair can never abort a batch.

use sakshya_core::{BackendSettings, ComparisonResult, Event, Verdict};
use sakshya_llm::prompts::comparison_prompt;
use sakshya_llm::{
    parse_verdict, select_classifier, CacheKey, Classifier, ComparisonCache,
    InMemoryComparisonCache, ResponseParseError,
};
use std::sync::Arc;
use thiserror::Error;

pub const NO_BACKEND_EXPLANATION: &str =
    "No classification backend configured; treated as consistent.";
pub const IDENTICAL_EVENTS_EXPLANATION: &str =
    "Both statements describe the exact same event details.";
pub const MALFORMED_RESPONSE_EXPLANATION: &str =
    "Backend response could not be parsed; treated as consistent for stability.";
pub const BACKEND_FAILURE_EXPLANATION: &str =
    "Skipped analysis due to backend error; treated as consistent for stability.";

/// Why a comparison fell back to consistent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComparisonFailure {
    #[error("no classification backend configured")]
    BackendUnconfigured,

    #[error("backend failure: {0}")]
    BackendRuntimeFailure(String),

    #[error("malformed backend response: {0}")]
    MalformedResponse(#[from] ResponseParseError),
}

impl ComparisonFailure {
    pub fn explanation(&self) -> &'static str {
        match self {
            ComparisonFailure::BackendUnconfigured => NO_BACKEND_EXPLANATION,
            ComparisonFailure::BackendRuntimeFailure(_) => BACKEND_FAILURE_EXPLANATION,
            ComparisonFailure::MalformedResponse(_) => MALFORMED_RESPONSE_EXPLANATION,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::consistent(self.explanation())
    }
}

fn normalize(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_lowercase()
}

/// Whether two events state the literal same fact: normalized actor,
/// action, and target all equal. Time and location are not considered.
pub fn events_identical(e1: &Event, e2: &Event) -> bool {
    normalize(Some(&e1.actor)) == normalize(Some(&e2.actor))
        && normalize(Some(&e1.action)) == normalize(Some(&e2.action))
        && normalize(e1.target.as_deref()) == normalize(e2.target.as_deref())
}

/// Classifies event pairs, consulting the cache before the backend.
pub struct Comparator {
    classifier: Option<Arc<dyn Classifier>>,
    cache: Arc<dyn ComparisonCache>,
}

impl Comparator {
    /// # Arguments
    /// * `classifier` - Active backend; `None` runs fully offline
    /// * `cache` - Verdict cache shared across comparisons
    pub fn new(classifier: Option<Arc<dyn Classifier>>, cache: Arc<dyn ComparisonCache>) -> Self {
        Self { classifier, cache }
    }

    /// Select the backend from settings and use the process-wide cache.
    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self::new(
            select_classifier(settings),
            InMemoryComparisonCache::shared(),
        )
    }

    pub fn has_backend(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn cache(&self) -> &Arc<dyn ComparisonCache> {
        &self.cache
    }

    /// Compare two events. Infallible.
    ///
    /// Identical events are always consistent and never consult the cache.
    pub async fn compare(&self, e1: &Event, e2: &Event) -> ComparisonResult {
        let identical = events_identical(e1, e2);
        let key = CacheKey::for_pair(e1, e2);
        if !identical {
            if let Some(cached) = self.cache.get(&key) {
                tracing::debug!(cache_key = %key, "Comparison cache hit");
                return cached.for_pair(e1, e2);
            }
        }

        let Some(classifier) = self.classifier.as_ref() else {
            return ComparisonFailure::BackendUnconfigured
                .verdict()
                .for_pair(e1, e2);
        };

        if identical {
            tracing::debug!(
                event_1 = %e1.event_id,
                event_2 = %e2.event_id,
                "Identical events, skipping backend"
            );
            return Verdict::consistent(IDENTICAL_EVENTS_EXPLANATION).for_pair(e1, e2);
        }

        tracing::debug!(
            event_1 = %e1.event_id,
            event_2 = %e2.event_id,
            backend = classifier.provider_id(),
            "Comparing events"
        );

        match self.classify(classifier.as_ref(), e1, e2).await {
            Ok(verdict) => {
                self.cache.put(key, verdict.clone());
                verdict.for_pair(e1, e2)
            }
            Err(failure) => {
                tracing::warn!(
                    event_1 = %e1.event_id,
                    event_2 = %e2.event_id,
                    error = %failure,
                    "Comparison failed, treating as consistent"
                );
                failure.verdict().for_pair(e1, e2)
            }
        }
    }

    async fn classify(
        &self,
        classifier: &dyn Classifier,
        e1: &Event,
        e2: &Event,
    ) -> Result<Verdict, ComparisonFailure> {
        let prompt = comparison_prompt(e1, e2);
        let raw = classifier
            .generate(&prompt)
            .await
            .map_err(|e| ComparisonFailure::BackendRuntimeFailure(e.to_string()))?;
        Ok(parse_verdict(&raw)?)
    }
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field(
                "backend",
                &self.classifier.as_ref().map(|c| c.provider_id().to_string()),
            )
            .field("cached_verdicts", &self.cache.len())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
