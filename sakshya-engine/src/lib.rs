//! SAKSHYA Engine - Cross-statement consistency sweep
//!
//! [`PairwiseOrchestrator`] is the entry point. It drives the
//! [`Comparator`] over every event pair that survives the core filter and
//! delegates extraction, scoring, localization, and report assembly to the
//! [`Collaborators`] it is built with.

pub mod collaborators;
pub mod comparator;
pub mod grouping;
pub mod orchestrator;

pub use collaborators::{Collaborators, Extractor, HeuristicsEngine, Linguist, ReportBuilder};
pub use comparator::{
    events_identical, Comparator, ComparisonFailure, BACKEND_FAILURE_EXPLANATION,
    IDENTICAL_EVENTS_EXPLANATION, MALFORMED_RESPONSE_EXPLANATION, NO_BACKEND_EXPLANATION,
};
pub use grouping::group_findings;
pub use orchestrator::{witness_pairs, PairwiseOrchestrator, SweepStats};

use sakshya_core::SakshyaConfig;

/// Build an orchestrator from configuration, selecting the classification
/// backend and sharing the process-wide comparison cache.
pub fn orchestrator_from_config(
    config: &SakshyaConfig,
    collaborators: Collaborators,
) -> PairwiseOrchestrator {
    PairwiseOrchestrator::new(
        Comparator::from_settings(&config.backends),
        collaborators,
        config.engine.clone(),
    )
}
