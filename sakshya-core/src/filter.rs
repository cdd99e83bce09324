//! Event pair filtering
//!
//! Cheap lexical predicates that gate every cell of the cross-product sweep
//! before any backend work is done. Matching is heuristic, not semantic.

use crate::{ActionCategory, Event};
use std::collections::HashSet;

/// Actor references that may point at anyone and so never exclude a pair.
pub const GENERIC_ACTORS: [&str; 9] = [
    "i", "he", "she", "they", "we", "witness", "unknown", "accused", "victim",
];

/// Keyword table for [`action_category`], checked in order.
const ACTION_KEYWORDS: [(ActionCategory, &[&str]); 6] = [
    (
        ActionCategory::Presence,
        &[
            "was present",
            "was inside",
            "standing",
            "present",
            "arrived",
            "sitting",
            "seen at",
            "at the spot",
        ],
    ),
    (
        ActionCategory::Movement,
        &[
            "came out", "went", "walking", "running", "fled", "escaped", "entered", "left",
            "moving",
        ],
    ),
    (
        ActionCategory::Absence,
        &[
            "was not present",
            "not there",
            "absent",
            "left before",
            "nowhere",
            "did not see",
            "not seen",
        ],
    ),
    (
        ActionCategory::Violence,
        &[
            "assaulted", "hit", "stabbed", "beat", "attacked", "slapped", "kicked", "shot",
            "fired",
        ],
    ),
    (
        ActionCategory::Weapon,
        &[
            "held knife",
            "used stick",
            "armed",
            "carrying",
            "brandished",
            "took out",
        ],
    ),
    (
        ActionCategory::Aftermath,
        &[
            "was bleeding",
            "was lying",
            "fell down",
            "unconscious",
            "died",
        ],
    ),
];

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whether two actor strings plausibly refer to the same person.
///
/// Returns false only when both names are non-generic, differ, and share
/// no whitespace token ("Raju" vs "Noel").
pub fn actors_consistent(actor_1: &str, actor_2: &str) -> bool {
    let a1 = normalize(actor_1);
    let a2 = normalize(actor_2);

    if a1 == a2 {
        return true;
    }

    if GENERIC_ACTORS.contains(&a1.as_str()) || GENERIC_ACTORS.contains(&a2.as_str()) {
        return true;
    }

    let tokens_1: HashSet<&str> = a1.split_whitespace().collect();
    let tokens_2: HashSet<&str> = a2.split_whitespace().collect();
    !tokens_1.is_disjoint(&tokens_2)
}

/// Classify an action phrase by keyword. First matching category wins.
pub fn action_category(action: &str) -> ActionCategory {
    let act = action.to_lowercase();
    ACTION_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| act.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ActionCategory::Other)
}

/// Whether two actions are worth comparing.
///
/// Always true: the keyword taxonomy cannot cover multilingual or free-form
/// phrasing, so even two `Other` actions go to the comparator. The
/// categories are computed for callers that want to prioritize.
pub fn actions_compatible(action_1: &str, action_2: &str) -> bool {
    let _ = (action_category(action_1), action_category(action_2));
    true
}

/// Gate for the cross-product sweep. Only actor inconsistency blocks a pair.
pub fn should_compare_events(e1: &Event, e2: &Event) -> bool {
    actors_consistent(&e1.actor, &e2.actor) && actions_compatible(&e1.action, &e2.action)
}

// =============================================================================
// TESTS
// =============================================================================
