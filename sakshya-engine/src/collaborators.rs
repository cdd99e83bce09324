//! Contracts for the services around the engine
//!
//! Extraction, severity scoring, localization, and report assembly are
//! supplied by the caller. The engine only consumes their outputs.

use async_trait::async_trait;
use sakshya_core::{ComparisonResult, ConsolidatedReport, Event, ReportRow, SakshyaResult};
use std::sync::Arc;

/// Turns raw statement text into ordered events.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str, statement_type: &str) -> SakshyaResult<Vec<Event>>;
}

/// Scores a classified pair into a report row.
pub trait HeuristicsEngine: Send + Sync {
    fn score(&self, result: ComparisonResult, e1: &Event, e2: &Event) -> ReportRow;
}

/// Language detection and localized explanation refinement.
#[async_trait]
pub trait Linguist: Send + Sync {
    /// Detect the language of a text, as a short code such as "en" or "ml".
    async fn detect_language(&self, text: &str) -> SakshyaResult<String>;

    /// Rewrite a row's explanation for the given language.
    async fn refine(&self, row: ReportRow, language: &str) -> SakshyaResult<ReportRow>;
}

/// Final report assembly.
pub trait ReportBuilder: Send + Sync {
    fn build(&self, rows: Vec<ReportRow>, language: &str) -> ConsolidatedReport;
}

/// The full set of collaborators an orchestrator needs.
#[derive(Clone)]
pub struct Collaborators {
    pub extractor: Arc<dyn Extractor>,
    pub heuristics: Arc<dyn HeuristicsEngine>,
    pub linguist: Arc<dyn Linguist>,
    pub report_builder: Arc<dyn ReportBuilder>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
