//! Core entity structures

use crate::Classification;
use serde::{Deserialize, Serialize};

/// A single factual assertion extracted from one witness statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Event {
    pub event_id: String,
    /// Procedural stage the statement was recorded at (e.g. "FIR", "161")
    pub statement_type: String,
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source_sentence: String,
}

impl Event {
    pub fn new(
        event_id: impl Into<String>,
        statement_type: impl Into<String>,
        actor: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            statement_type: statement_type.into(),
            actor: actor.into(),
            action: action.into(),
            target: None,
            time: None,
            location: None,
            source_sentence: String::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_source_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.source_sentence = sentence.into();
        self
    }
}

/// One statement submitted to an analysis batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WitnessInput {
    pub id: String,
    /// Display name, e.g. "PW-1"
    pub name: String,
    /// Procedural type of the statement
    #[serde(rename = "type")]
    pub witness_type: String,
    pub text: String,
}

impl WitnessInput {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        witness_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            witness_type: witness_type.into(),
            text: text.into(),
        }
    }

    /// Report label for one of this witness's events:
    /// `"<name> (<type>): <actor> <action>"`.
    pub fn source_label(&self, event: &Event) -> String {
        format!(
            "{} ({}): {} {}",
            self.name, self.witness_type, event.actor, event.action
        )
    }
}

/// Classification and explanation, independent of which events produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Verdict {
    pub classification: Classification,
    pub explanation: String,
}

impl Verdict {
    pub fn new(classification: Classification, explanation: impl Into<String>) -> Self {
        Self {
            classification,
            explanation: explanation.into(),
        }
    }

    pub fn consistent(explanation: impl Into<String>) -> Self {
        Self::new(Classification::Consistent, explanation)
    }

    /// Bind this verdict to a concrete event pair.
    pub fn for_pair(&self, e1: &Event, e2: &Event) -> ComparisonResult {
        ComparisonResult {
            event_1_id: e1.event_id.clone(),
            event_2_id: e2.event_id.clone(),
            classification: self.classification,
            explanation: self.explanation.clone(),
        }
    }
}

/// Outcome of comparing two events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComparisonResult {
    pub event_1_id: String,
    pub event_2_id: String,
    pub classification: Classification,
    pub explanation: String,
}

impl ComparisonResult {
    /// Strip the event identities, leaving the cacheable part.
    pub fn verdict(&self) -> Verdict {
        Verdict::new(self.classification, self.explanation.clone())
    }
}

/// Scored finding as produced by the heuristics collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportRow {
    pub source_1: String,
    pub source_2: String,
    pub classification: Classification,
    pub severity: String,
    pub explanation: String,
}

/// Rows plus disclaimer, as assembled by the report builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConsolidatedReport {
    pub rows: Vec<ReportRow>,
    pub disclaimer: String,
}

/// Response of a multi-witness analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisResponse {
    pub input_language: String,
    pub analysis_language: String,
    pub consolidated_report: Vec<ReportRow>,
    pub disclaimer: String,
}
