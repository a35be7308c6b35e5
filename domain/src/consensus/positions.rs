//! Persona positions and decision evolution
//!
//! Groups the transcript by role, detects which catalogue topics are being
//! discussed and pulls a position sentence and a reasoning sentence for each
//! role out of its most substantial relevant turn.

use crate::consensus::metrics::{DecisionEvolution, PersonaPosition};
use crate::consensus::rule_based::has_conflict_marker;
use crate::consensus::tuning::ConsensusTuning;
use crate::core::string::{sentences, tokens, truncate};
use crate::discussion::role::RoleId;
use crate::discussion::turn::Turn;
use std::collections::BTreeMap;

/// Most topics reported per transcript
pub const MAX_DETECTED_ISSUES: usize = 5;

/// Ceiling on a position's confidence
pub const MAX_POSITION_CONFIDENCE: u8 = 95;

/// Agreement level at which a topic counts as resolved
pub const RESOLVED_AGREEMENT: u8 = 80;

const FALLBACK_CONFLICT_ISSUE: &str = "disagreement";
const FALLBACK_GENERAL_ISSUE: &str = "implementation details";

const POSITION_MARKERS: &[&str] = &[
    "should", "recommend", "suggest", "propose", "prefer", "must", "need", "needs",
];
const REASONING_MARKERS: &[&str] = &[
    "because",
    "since",
    "therefore",
    "due to",
    "so that",
    "as a result",
    "which means",
];

/// Length of the reasoning excerpt when no causal sentence exists
const REASONING_EXCERPT_BYTES: usize = 160;

struct IssueCategory {
    name: &'static str,
    keywords: &'static [&'static str],
    synonyms: &'static [&'static str],
}

const ISSUE_CATALOGUE: &[IssueCategory] = &[
    IssueCategory {
        name: "authentication",
        keywords: &["auth", "authentication", "login", "oauth", "sso", "password"],
        synonyms: &["token", "tokens", "credentials", "identity", "session", "sessions"],
    },
    IssueCategory {
        name: "storage",
        keywords: &["storage", "database", "postgres", "sql", "persistence", "schema"],
        synonyms: &["db", "data", "cache", "tables", "records"],
    },
    IssueCategory {
        name: "API",
        keywords: &["api", "endpoint", "endpoints", "rest", "graphql"],
        synonyms: &["contract", "interface", "request", "requests", "response"],
    },
    IssueCategory {
        name: "UI",
        keywords: &["ui", "ux", "frontend", "screen", "screens"],
        synonyms: &["layout", "usability", "page", "pages", "user-facing"],
    },
    IssueCategory {
        name: "deployment",
        keywords: &["deployment", "deploy", "kubernetes", "docker", "pipeline", "release"],
        synonyms: &["rollout", "ci", "hosting", "infrastructure", "environment"],
    },
    IssueCategory {
        name: "testing",
        keywords: &["testing", "test", "tests", "coverage", "regression"],
        synonyms: &["qa", "bug", "bugs", "verification"],
    },
    IssueCategory {
        name: "security",
        keywords: &["security", "vulnerability", "encryption", "threat", "compliance"],
        synonyms: &["attack", "privacy", "secure", "exposure"],
    },
    IssueCategory {
        name: "performance",
        keywords: &["performance", "latency", "throughput", "scalability", "load"],
        synonyms: &["fast", "slow", "speed", "bottleneck", "optimization"],
    },
];

/// A position plus the turn it was extracted from
struct Extracted<'a> {
    position: PersonaPosition,
    source: &'a Turn,
}

/// Issue topic → one position per role that spoke to it.
///
/// Topics come from the fixed catalogue, ranked by how often their keywords
/// appear across the whole transcript (at most five). With no catalogue hit a
/// single generic topic is used and every role's turns count as relevant.
pub fn extract_persona_positions(
    turns: &[Turn],
    tuning: &ConsensusTuning,
) -> BTreeMap<String, Vec<PersonaPosition>> {
    extract(turns, tuning)
        .into_iter()
        .map(|(issue, found)| (issue, found.into_iter().map(|e| e.position).collect()))
        .collect()
}

/// One [`DecisionEvolution`] per topic discussed in `round`.
///
/// The agreement level is the share of positioned roles whose source turn
/// carries no conflict marker. A topic is resolved once at least two roles
/// hold a position and agreement reaches [`RESOLVED_AGREEMENT`].
pub fn track_decision_evolution(
    turns: &[Turn],
    round: u32,
    tuning: &ConsensusTuning,
) -> Vec<DecisionEvolution> {
    let round_turns: Vec<Turn> = turns.iter().filter(|t| t.round == round).cloned().collect();

    extract(&round_turns, tuning)
        .into_iter()
        .map(|(topic, found)| {
            let agreeing = found
                .iter()
                .filter(|e| !has_conflict_marker(&e.source.content, tuning))
                .count();
            let agreement_level = if found.is_empty() {
                0
            } else {
                (agreeing * 100 / found.len()) as u8
            };
            let positions = found
                .iter()
                .map(|e| (e.position.role.to_string(), e.position.position.clone()))
                .collect();

            DecisionEvolution {
                round,
                topic,
                positions,
                agreement_level,
                resolved: found.len() >= 2 && agreement_level >= RESOLVED_AGREEMENT,
            }
        })
        .collect()
}

fn extract<'a>(turns: &'a [Turn], tuning: &ConsensusTuning) -> BTreeMap<String, Vec<Extracted<'a>>> {
    let mut result = BTreeMap::new();
    if turns.is_empty() {
        return result;
    }

    let by_role = group_by_role(turns);
    let detected = detect_issues(turns);

    if detected.is_empty() {
        let fallback = if turns.iter().any(|t| has_conflict_marker(&t.content, tuning)) {
            FALLBACK_CONFLICT_ISSUE
        } else {
            FALLBACK_GENERAL_ISSUE
        };
        let found = by_role
            .iter()
            .filter_map(|(role, role_turns)| most_substantial(role_turns).map(|t| (role, t)))
            .map(|(role, turn)| extract_from(role, turn))
            .collect();
        result.insert(fallback.to_string(), found);
        return result;
    }

    for category in detected {
        let found: Vec<Extracted<'a>> = by_role
            .iter()
            .filter_map(|(role, role_turns)| {
                let relevant: Vec<&Turn> = role_turns
                    .iter()
                    .copied()
                    .filter(|t| is_relevant(category, &t.content))
                    .collect();
                most_substantial(&relevant).map(|t| extract_from(role, t))
            })
            .collect();
        if !found.is_empty() {
            result.insert(category.name.to_string(), found);
        }
    }
    result
}

/// Roles in first-spoken order with their turns
fn group_by_role(turns: &[Turn]) -> Vec<(RoleId, Vec<&Turn>)> {
    let mut groups: Vec<(RoleId, Vec<&Turn>)> = Vec::new();
    for turn in turns {
        match groups.iter_mut().find(|(role, _)| *role == turn.role) {
            Some((_, list)) => list.push(turn),
            None => groups.push((turn.role.clone(), vec![turn])),
        }
    }
    groups
}

/// Catalogue categories with at least one keyword hit, most hits first
fn detect_issues(turns: &[Turn]) -> Vec<&'static IssueCategory> {
    let words: Vec<String> = turns.iter().flat_map(|t| tokens(&t.content)).collect();

    let mut hits: Vec<(&'static IssueCategory, usize)> = ISSUE_CATALOGUE
        .iter()
        .map(|category| {
            let count = words
                .iter()
                .filter(|w| category.keywords.contains(&w.as_str()))
                .count();
            (category, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    // stable: ties keep catalogue order
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.into_iter()
        .take(MAX_DETECTED_ISSUES)
        .map(|(category, _)| category)
        .collect()
}

fn is_relevant(category: &IssueCategory, content: &str) -> bool {
    tokens(content).any(|w| {
        category.keywords.contains(&w.as_str()) || category.synonyms.contains(&w.as_str())
    })
}

fn most_substantial<'a>(turns: &[&'a Turn]) -> Option<&'a Turn> {
    // first of the longest wins
    turns
        .iter()
        .copied()
        .rev()
        .max_by_key(|t| t.content.len())
}

fn extract_from<'a>(role: &RoleId, turn: &'a Turn) -> Extracted<'a> {
    let parts = sentences(&turn.content);

    let marked_position = parts.iter().find(|s| contains_marker(s, POSITION_MARKERS));
    let position = marked_position
        .or_else(|| parts.iter().max_by_key(|s| s.len()))
        .map(|s| s.to_string())
        .unwrap_or_default();

    let marked_reasoning = parts.iter().find(|s| contains_marker(s, REASONING_MARKERS));
    let reasoning = match marked_reasoning {
        Some(s) => s.to_string(),
        None => truncate(turn.content.trim(), REASONING_EXCERPT_BYTES),
    };

    let mut confidence: u8 = 50;
    if turn.content.len() > 200 {
        confidence += 15;
    }
    if marked_position.is_some() {
        confidence += 15;
    }
    if marked_reasoning.is_some() {
        confidence += 15;
    }

    Extracted {
        position: PersonaPosition {
            role: role.clone(),
            position,
            reasoning,
            confidence: confidence.min(MAX_POSITION_CONFIDENCE),
        },
        source: turn,
    }
}

/// Whole-word (or whole-phrase) match against `markers`
fn contains_marker(sentence: &str, markers: &[&str]) -> bool {
    let normalized = format!(" {} ", tokens(sentence).collect::<Vec<_>>().join(" "));
    markers
        .iter()
        .any(|m| normalized.contains(&format!(" {} ", m)))
}
