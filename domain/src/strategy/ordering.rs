//! Speaking order generation

use crate::consensus::metrics::ConsensusMetrics;
use crate::discussion::config::DynamicRoundConfig;
use crate::strategy::moderator::{InsertionHint, ModeratorPolicy, should_include_moderator};
use crate::strategy::tables::ResolvedTables;
use std::collections::BTreeMap;

/// Order attached to an evaluation result: the phase's base order, with the
/// moderator prepended when conflicts exist.
pub fn generate_recommended_order(
    metrics: &ConsensusMetrics,
    config: &DynamicRoundConfig,
    tables: &ResolvedTables,
) -> Vec<usize> {
    let mut order = tables.base_order(metrics.discussion_phase).to_vec();
    if metrics.has_conflicts() && config.moderator_enabled {
        order.retain(|&i| i != tables.moderator);
        order.insert(0, tables.moderator);
    }
    order
}

/// Order for the round about to start.
///
/// Phase base order, then the moderator (if the inclusion policy says so),
/// then the issue-driven re-sort and finally the anti-repetition guard.
pub fn generate_next_round(
    current_round: u32,
    metrics: &ConsensusMetrics,
    config: &DynamicRoundConfig,
    previous_orders: &[Vec<usize>],
    tables: &ResolvedTables,
    policy: &ModeratorPolicy,
) -> Vec<usize> {
    let mut order = tables.base_order(metrics.discussion_phase).to_vec();

    let decision = should_include_moderator(metrics, config, current_round, policy);
    if decision.include {
        order.retain(|&i| i != tables.moderator);
        order.insert(decision.insertion.slot(order.len()), tables.moderator);
    }

    let order = optimize_order_for_issues(&order, &metrics.unresolved_issues, tables);
    avoid_repetition(order, previous_orders, tables.moderator)
}

/// Move the roles responsible for the unresolved issues forward.
///
/// Each issue is scored against every keyword category and the hits are
/// credited to the category's responsible role. Non-moderator entries are
/// stable-sorted by descending score; the moderator keeps its relative
/// position (start, end, or middle).
pub fn optimize_order_for_issues(
    order: &[usize],
    issues: &[String],
    tables: &ResolvedTables,
) -> Vec<usize> {
    let mut scores: BTreeMap<usize, usize> = BTreeMap::new();
    for issue in issues {
        for category in &tables.issue_categories {
            let hits = category.hits(issue);
            if hits > 0 {
                *scores.entry(category.responsible).or_default() += hits;
            }
        }
    }
    if scores.is_empty() {
        return order.to_vec();
    }

    let moderator_slot = order
        .iter()
        .position(|&i| i == tables.moderator)
        .map(|pos| match pos {
            0 => InsertionHint::Front,
            p if p + 1 == order.len() => InsertionHint::End,
            _ => InsertionHint::Middle,
        });

    let mut sorted: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| i != tables.moderator)
        .collect();
    sorted.sort_by(|a, b| {
        let sa = scores.get(a).copied().unwrap_or(0);
        let sb = scores.get(b).copied().unwrap_or(0);
        sb.cmp(&sa)
    });

    if let Some(hint) = moderator_slot {
        sorted.insert(hint.slot(sorted.len()), tables.moderator);
    }
    sorted
}

/// Swap the first two non-moderator entries when `order` repeats the
/// previous round's order exactly.
pub fn avoid_repetition(
    mut order: Vec<usize>,
    previous_orders: &[Vec<usize>],
    moderator: usize,
) -> Vec<usize> {
    if previous_orders.last() != Some(&order) {
        return order;
    }

    let experts: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|&(_, &i)| i != moderator)
        .map(|(pos, _)| pos)
        .collect();
    if let [first, second, ..] = experts[..] {
        order.swap(first, second);
    }
    order
}
