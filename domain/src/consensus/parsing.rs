//! Consensus scorer response parsing.
//!
//! The AI scorer is asked for a JSON object but replies in free text. These
//! functions find the first JSON object in the reply and read it field by
//! field, coercing or defaulting anything malformed instead of rejecting the
//! whole response. Pure text handling, no I/O.
//!
//! | Field | Accepted | Otherwise |
//! |-------|----------|-----------|
//! | `agreementScore` | number or numeric string, clamped 0-100 | 0 |
//! | `unresolvedIssues` | array (string items kept) | empty |
//! | `conflictingPositions` | object of string arrays | empty |
//! | `confidenceLevel` | number or numeric string, clamped 0-100 | 0, or the AI-path constant when absent |
//! | `discussionPhase` | one of the four phases | `exploration` |

use crate::consensus::metrics::{ConsensusMetrics, DiscussionPhase};
use crate::consensus::tuning::ConsensusTuning;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Find the first balanced `{...}` in `text` that parses as a JSON object.
///
/// Braces inside JSON strings are ignored, so prose before or after the
/// object (or a markdown code fence around it) does not matter.
///
/// # Examples
///
/// ```
/// use roundtable_domain::consensus::parsing::extract_first_json_object;
///
/// let reply = "Here you go:\n```json\n{\"agreementScore\": 70}\n```";
/// let object = extract_first_json_object(reply).unwrap();
/// assert_eq!(object["agreementScore"], 70);
/// assert!(extract_first_json_object("no json here").is_none());
/// ```
pub fn extract_first_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&text[start..])
            && let Ok(Value::Object(map)) = serde_json::from_str(&text[start..start + end])
        {
            return Some(map);
        }
        search_from = start + 1;
    }
    None
}

/// Byte length of the balanced object starting at `text[0] == '{'`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a scorer reply into metrics.
///
/// Returns `None` only when the reply holds no JSON object at all; every
/// individual field is tolerated.
pub fn parse_scorer_response(response: &str, tuning: &ConsensusTuning) -> Option<ConsensusMetrics> {
    let object = extract_first_json_object(response)?;

    let agreement_score = coerce_percent(object.get("agreementScore"));
    let confidence_level = match object.get("confidenceLevel") {
        None => i64::from(tuning.ai_assisted_confidence),
        present => coerce_percent(present),
    };

    let unresolved_issues = match object.get("unresolvedIssues") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    let conflicting_positions = match object.get("conflictingPositions") {
        Some(Value::Object(map)) => string_array_map(map),
        _ => BTreeMap::new(),
    };

    let discussion_phase = object
        .get("discussionPhase")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(DiscussionPhase::Exploration);

    Some(ConsensusMetrics::new(
        agreement_score,
        unresolved_issues,
        conflicting_positions,
        confidence_level,
        discussion_phase,
    ))
}

/// Numbers and numeric strings, rounded and clamped; anything else is 0
fn coerce_percent(value: Option<&Value>) -> i64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => (n.round() as i64).clamp(0, 100),
        _ => 0,
    }
}

/// Keep only entries whose value is an array of strings. A role with an
/// empty array holds no position and is dropped.
fn string_array_map(map: &Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    map.iter()
        .filter_map(|(role, value)| {
            let items = value.as_array()?;
            let positions: Option<Vec<String>> =
                items.iter().map(|v| v.as_str().map(String::from)).collect();
            positions
                .filter(|p| !p.is_empty())
                .map(|p| (role.clone(), p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(response: &str) -> Option<ConsensusMetrics> {
        parse_scorer_response(response, &ConsensusTuning::default())
    }

    #[test]
    fn test_well_formed_response() {
        let response = r#"{
            "agreementScore": 82,
            "unresolvedIssues": ["token expiry"],
            "conflictingPositions": {"security": ["wants shorter sessions"]},
            "confidenceLevel": 90,
            "discussionPhase": "resolution"
        }"#;
        let metrics = parse(response).unwrap();
        assert_eq!(metrics.agreement_score, 82);
        assert_eq!(metrics.unresolved_issues, vec!["token expiry"]);
        assert_eq!(
            metrics.conflicting_positions["security"],
            vec!["wants shorter sessions"]
        );
        assert_eq!(metrics.confidence_level, 90);
        assert_eq!(metrics.discussion_phase, DiscussionPhase::Resolution);
    }

    #[test]
    fn test_json_inside_prose_and_fence() {
        let response = r#"
My analysis {of sorts}:
```json
{"agreementScore": "64", "discussionPhase": "alignment", "note": "a } brace"}
```
"#;
        let metrics = parse(response).unwrap();
        assert_eq!(metrics.agreement_score, 64);
        assert_eq!(metrics.discussion_phase, DiscussionPhase::Alignment);
    }

    #[test]
    fn test_fields_coerced_individually() {
        let response = r#"{
            "agreementScore": 180.6,
            "unresolvedIssues": "not a list",
            "conflictingPositions": {"qa": "not a list", "developer": ["fine", 3], "architect": ["layering"]},
            "confidenceLevel": "high",
            "discussionPhase": "wrapping up"
        }"#;
        let metrics = parse(response).unwrap();
        assert_eq!(metrics.agreement_score, 100);
        assert!(metrics.unresolved_issues.is_empty());
        assert_eq!(metrics.conflicting_positions.len(), 1);
        assert!(metrics.conflicting_positions.contains_key("architect"));
        assert_eq!(metrics.confidence_level, 0);
        assert_eq!(metrics.discussion_phase, DiscussionPhase::Exploration);
    }

    #[test]
    fn test_missing_confidence_uses_ai_constant() {
        let metrics = parse(r#"{"agreementScore": -4}"#).unwrap();
        assert_eq!(metrics.agreement_score, 0);
        assert_eq!(metrics.confidence_level, 80);
    }

    #[test]
    fn test_no_object_is_none() {
        assert!(parse("I could not decide.").is_none());
        assert!(parse("[1, 2, 3]").is_none());
        assert!(parse("{ unterminated").is_none());
    }
}
