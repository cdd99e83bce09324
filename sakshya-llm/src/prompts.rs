//! Prompt templates sent to classification backends.

use sakshya_core::Event;

/// Chat system prompt for backends that take one separately.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

const COMPARISON_TEMPLATE: &str = r#"
You are a legal reasoning assistant helping prepare cross-examination.

The events may be in any language. Respond in the same language as the input
and do not translate. The `explanation` field must use the language of the
events.

You are comparing TWO extracted events recorded at DIFFERENT procedural
stages. Do not decide truth. Only classify semantic consistency.

====================
EVENT 1 ({type_1})
====================
Actor: {actor_1}
Action: {action_1}
Target: {target_1}
Time: {time_1}
Location: {location_1}

====================
EVENT 2 ({type_2})
====================
Actor: {actor_2}
Action: {action_2}
Target: {target_2}
Time: {time_2}
Location: {location_2}

====================
CLASSIFICATION RULES
====================

Choose EXACTLY ONE label, the most specific that applies.

1. consistent (DEFAULT if uncertain)
   - Both events assert compatible facts, or
   - they describe different, independent facts that are not mutually exclusive.
   - "A hit B" vs "A assaulted B" is consistent.
   - "I was at the tea shop" vs "I saw them fight" is consistent.

2. contradiction
   - Both statements cannot be true at the same time.
   - "A assaulted B" vs "A was not there at all".
   - "A stabbed B" vs "A only pushed B".

3. omission
   - One event mentions a material fact the other is entirely silent about.
   - The first report mentions an assault, a later statement adds a weapon.

4. minor_discrepancy
   - Slight differences in non-material details (time within 30 minutes,
     location descriptors).

Guidelines:
- If one event says WHERE the witness was and the other says WHAT they saw,
  that is consistent unless the location makes the observation impossible.
- Presence vs participation mismatch is a contradiction.
- Active assault vs passive presence is a contradiction.
- Weapon mismatch is a contradiction.
- Two unrelated sentences ("I am Devan" vs "I saw the fight") are consistent.

====================
OUTPUT FORMAT (STRICT)
====================

Return ONLY valid JSON:

{"classification": "contradiction | omission | consistent | minor_discrepancy", "explanation": "1-2 sentences of legal reasoning."}

Do not mention guilt or credibility. Do not output anything outside JSON.
"#;

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

fn placeholder<'a>(name: &str, e1: &'a Event, e2: &'a Event) -> Option<&'a str> {
    let value = match name {
        "type_1" => &e1.statement_type,
        "actor_1" => &e1.actor,
        "action_1" => &e1.action,
        "target_1" => return Some(field(&e1.target)),
        "time_1" => return Some(field(&e1.time)),
        "location_1" => return Some(field(&e1.location)),
        "type_2" => &e2.statement_type,
        "actor_2" => &e2.actor,
        "action_2" => &e2.action,
        "target_2" => return Some(field(&e2.target)),
        "time_2" => return Some(field(&e2.time)),
        "location_2" => return Some(field(&e2.location)),
        _ => return None,
    };
    Some(value.as_str())
}

/// Render the comparison prompt for an ordered event pair.
///
/// Single pass over the template: inserted values are never rescanned, so
/// event text containing `{actor_2}` or similar is sent verbatim. Braces
/// that do not name a placeholder are copied through.
pub fn comparison_prompt(e1: &Event, e2: &Event) -> String {
    let mut out = String::with_capacity(COMPARISON_TEMPLATE.len() + 256);
    let mut rest = COMPARISON_TEMPLATE;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after
            .find('}')
            .and_then(|close| placeholder(&after[..close], e1, e2).map(|v| (close, v)));
        match substitution {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Wrap a prompt in the ChatML turn markers instruct models expect.
pub fn chatml_user_turn(prompt: &str) -> String {
    format!(
        "<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n",
        prompt
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_prompt_embeds_both_events() {
        let e1 = Event::new("E1", "FIR", "John", "went to market").with_time("5 PM");
        let e2 = Event::new("E2", "Deposition", "John", "was at home")
            .with_time("5 PM")
            .with_location("Kochi");
        let prompt = comparison_prompt(&e1, &e2);

        assert!(prompt.contains("EVENT 1 (FIR)"));
        assert!(prompt.contains("EVENT 2 (Deposition)"));
        assert!(prompt.contains("Action: went to market"));
        assert!(prompt.contains("Action: was at home"));
        assert!(prompt.contains("Location: Kochi"));
        assert!(prompt.contains("Target: null"));
        assert!(!prompt.contains("{actor_1}"));
        assert!(!prompt.contains("{location_2}"));
    }

    #[test]
    fn test_comparison_prompt_keeps_json_braces() {
        let e = Event::new("E1", "FIR", "A", "b");
        let prompt = comparison_prompt(&e, &e);
        assert!(prompt.contains("{\"classification\":"));
    }

    #[test]
    fn test_placeholder_text_in_event_is_not_substituted() {
        let e1 = Event::new("E1", "FIR", "{action_2}", "shouted {location_1}")
            .with_location("Kochi");
        let e2 = Event::new("E2", "161", "Raju", "stayed home");
        let prompt = comparison_prompt(&e1, &e2);

        assert!(prompt.contains("Actor: {action_2}\n"));
        assert!(prompt.contains("Action: shouted {location_1}\n"));
        assert!(prompt.contains("Action: stayed home\n"));
        assert_eq!(prompt.matches("stayed home").count(), 1);
        assert_eq!(prompt.matches("Kochi").count(), 1);
    }

    #[test]
    fn test_chatml_wrapping() {
        let wrapped = chatml_user_turn("hello");
        assert!(wrapped.starts_with("<|im_start|>user\nhello<|im_end|>"));
        assert!(wrapped.ends_with("<|im_start|>assistant\n"));
    }
}
