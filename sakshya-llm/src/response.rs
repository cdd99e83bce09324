//! Parsing of raw backend output into a verdict.

use sakshya_core::{Classification, Verdict};
use serde_json::Value;
use thiserror::Error;

/// Explanation used when the backend omits one.
pub const DEFAULT_EXPLANATION: &str = "No explanation provided.";

/// Backend output that cannot be turned into a verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("unknown classification label: {0}")]
    UnknownClassification(String),
}

/// Remove one leading code fence (```` ```json ```` or ```` ``` ````) and one
/// trailing fence, trimming whitespace around the body.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse a backend response.
///
/// A missing or null `classification` defaults to consistent and a missing
/// or blank `explanation` to [`DEFAULT_EXPLANATION`].
pub fn parse_verdict(raw: &str) -> Result<Verdict, ResponseParseError> {
    let body = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|e| ResponseParseError::NotJson(e.to_string()))?;
    let object = value.as_object().ok_or(ResponseParseError::NotAnObject)?;

    let classification = match object.get("classification") {
        None | Some(Value::Null) => Classification::Consistent,
        Some(Value::String(label)) => Classification::from_label(label)
            .map_err(|_| ResponseParseError::UnknownClassification(label.clone()))?,
        Some(other) => return Err(ResponseParseError::UnknownClassification(other.to_string())),
    };

    let explanation = match object.get("explanation") {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        _ => DEFAULT_EXPLANATION.to_string(),
    };

    Ok(Verdict::new(classification, explanation))
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any valid label survives fencing and parsing.
        #[test]
        fn prop_fenced_label_parses(
            idx in 0usize..Classification::ALL.len(),
            fence in prop_oneof![Just(""), Just("```"), Just("```json")],
            explanation in "[a-zA-Z .]{1,40}"
        ) {
            let classification = Classification::ALL[idx];
            let json = serde_json::json!({
                "classification": classification.as_str(),
                "explanation": explanation,
            });
            let close = if fence.is_empty() { "" } else { "```" };
            let raw = format!("{fence}\n{json}\n{close}");

            let verdict = parse_verdict(&raw).unwrap();
            prop_assert_eq!(verdict.classification, classification);
        }

        /// Parsing arbitrary text never panics.
        #[test]
        fn prop_parse_never_panics(raw in ".{0,120}") {
            let _ = parse_verdict(&raw);
        }
    }
}
