//! SAKSHYA Core - Entity Types
//!
//! Data model, configuration, errors, and the event pair filter shared by
//! every other crate. No I/O lives here.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;

pub use config::{
    BackendKind, BackendSettings, CloudBackendSettings, EngineSettings, ExtractionFailurePolicy,
    HostedBackendSettings, LocalBackendSettings, RemoteBackendSettings, SakshyaConfig,
};
pub use entities::{
    AnalysisResponse, ComparisonResult, ConsolidatedReport, Event, ReportRow, Verdict,
    WitnessInput,
};
pub use enums::{ActionCategory, Classification, ClassificationParseError};
pub use error::{
    CollaboratorError, ConfigError, LlmError, SakshyaError, SakshyaResult, ValidationError,
};
pub use filter::{action_category, actions_compatible, actors_consistent, should_compare_events};

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier for one analysis run. UUIDv7, so runs sort by start time.
pub type RunId = uuid::Uuid;

/// Generate a new UUIDv7 run id (timestamp-sortable).
pub fn new_run_id() -> RunId {
    uuid::Uuid::now_v7()
}
