//! Enum types for SAKSHYA findings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Semantic relationship between two compared events.
///
/// `Consistent` is the default whenever a comparison is inconclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Compatible or independent facts
    #[default]
    Consistent,
    /// Both statements cannot be true at the same time
    Contradiction,
    /// One side mentions a material fact the other is silent about
    Omission,
    /// Non-material difference (time, location descriptors)
    MinorDiscrepancy,
}

impl Classification {
    /// All labels, in report order.
    pub const ALL: [Classification; 4] = [
        Classification::Consistent,
        Classification::Contradiction,
        Classification::Omission,
        Classification::MinorDiscrepancy,
    ];

    /// Wire label used in backend responses and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Consistent => "consistent",
            Classification::Contradiction => "contradiction",
            Classification::Omission => "omission",
            Classification::MinorDiscrepancy => "minor_discrepancy",
        }
    }

    /// Parse a label, tolerating case and space/hyphen separators.
    pub fn from_label(s: &str) -> Result<Self, ClassificationParseError> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "consistent" => Ok(Classification::Consistent),
            "contradiction" => Ok(Classification::Contradiction),
            "omission" => Ok(Classification::Omission),
            "minor_discrepancy" => Ok(Classification::MinorDiscrepancy),
            _ => Err(ClassificationParseError(s.to_string())),
        }
    }

    /// Whether this finding belongs in the consolidated report.
    pub fn is_finding(&self) -> bool {
        !matches!(self, Classification::Consistent)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Classification {
    type Err = ClassificationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Error when parsing an invalid classification label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationParseError(pub String);

impl fmt::Display for ClassificationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid classification: {}", self.0)
    }
}

impl std::error::Error for ClassificationParseError {}

// ============================================================================
// ACTION CATEGORY
// ============================================================================

/// Coarse category of an event's action phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Presence,
    Movement,
    Absence,
    Violence,
    Weapon,
    Aftermath,
    Other,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Presence => "presence",
            ActionCategory::Movement => "movement",
            ActionCategory::Absence => "absence",
            ActionCategory::Violence => "violence",
            ActionCategory::Weapon => "weapon",
            ActionCategory::Aftermath => "aftermath",
            ActionCategory::Other => "other",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_labels_roundtrip() {
        for c in Classification::ALL {
            assert_eq!(Classification::from_label(c.as_str()), Ok(c));
        }
    }

    #[test]
    fn test_classification_lenient_parse() {
        assert_eq!(
            Classification::from_label("  Minor Discrepancy "),
            Ok(Classification::MinorDiscrepancy)
        );
        assert_eq!(
            Classification::from_label("CONTRADICTION"),
            Ok(Classification::Contradiction)
        );
        assert!(Classification::from_label("contradiction | omission").is_err());
        assert!(Classification::from_label("").is_err());
    }

    #[test]
    fn test_classification_serde_snake_case() {
        let json = serde_json::to_string(&Classification::MinorDiscrepancy).unwrap();
        assert_eq!(json, "\"minor_discrepancy\"");
        let back: Classification = serde_json::from_str("\"omission\"").unwrap();
        assert_eq!(back, Classification::Omission);
    }

    #[test]
    fn test_only_consistent_is_not_a_finding() {
        assert!(!Classification::Consistent.is_finding());
        assert!(Classification::Contradiction.is_finding());
        assert!(Classification::Omission.is_finding());
        assert!(Classification::MinorDiscrepancy.is_finding());
    }
}
