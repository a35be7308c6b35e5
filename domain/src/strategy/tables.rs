//! Declarative ordering tables
//!
//! Speaking orders are written in terms of [`RoleId`]s and resolved against
//! a [`RoleRoster`] once, when a discussion is set up. The round loop only
//! ever sees the resolved indices.

use crate::consensus::metrics::DiscussionPhase;
use crate::core::error::ConfigError;
use crate::discussion::role::{RoleId, RoleRoster};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One order per discussion phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOrders<T> {
    pub exploration: Vec<T>,
    pub alignment: Vec<T>,
    pub resolution: Vec<T>,
    pub finalization: Vec<T>,
}

impl<T> PhaseOrders<T> {
    pub fn get(&self, phase: DiscussionPhase) -> &[T] {
        match phase {
            DiscussionPhase::Exploration => &self.exploration,
            DiscussionPhase::Alignment => &self.alignment,
            DiscussionPhase::Resolution => &self.resolution,
            DiscussionPhase::Finalization => &self.finalization,
        }
    }

    fn try_map<U, E>(
        &self,
        mut f: impl FnMut(DiscussionPhase, &[T]) -> Result<Vec<U>, E>,
    ) -> Result<PhaseOrders<U>, E> {
        Ok(PhaseOrders {
            exploration: f(DiscussionPhase::Exploration, &self.exploration)?,
            alignment: f(DiscussionPhase::Alignment, &self.alignment)?,
            resolution: f(DiscussionPhase::Resolution, &self.resolution)?,
            finalization: f(DiscussionPhase::Finalization, &self.finalization)?,
        })
    }
}

/// Keywords that route an unresolved issue to the role responsible for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCategory<R> {
    pub name: String,
    pub keywords: Vec<String>,
    pub responsible: R,
}

impl<R> IssueCategory<R> {
    /// Number of keyword occurrences in `issue` (case-insensitive substring)
    pub fn hits(&self, issue: &str) -> usize {
        let lower = issue.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count()
    }
}

/// Ordering tables in terms of role identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingTables {
    pub phase_orders: PhaseOrders<RoleId>,
    pub issue_categories: Vec<IssueCategory<RoleId>>,
    /// Forced final round, moderator enabled
    pub final_with_moderator: Vec<RoleId>,
    /// Forced final round, moderator disabled
    pub final_without_moderator: Vec<RoleId>,
}

fn ids(names: &[&str]) -> Vec<RoleId> {
    names.iter().map(|&n| RoleId::from(n)).collect()
}

fn category(name: &str, keywords: &[&str], responsible: &str) -> IssueCategory<RoleId> {
    IssueCategory {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        responsible: RoleId::from(responsible),
    }
}

impl Default for OrderingTables {
    fn default() -> Self {
        Self {
            phase_orders: PhaseOrders {
                exploration: ids(&["product", "architect", "developer", "security", "qa"]),
                alignment: ids(&["architect", "developer", "security", "qa", "product"]),
                resolution: ids(&["security", "qa", "developer", "architect", "product"]),
                finalization: ids(&["product", "architect", "developer", "qa", "security"]),
            },
            issue_categories: vec![
                category(
                    "architecture",
                    &["architecture", "design", "structure", "scalability", "component"],
                    "architect",
                ),
                category(
                    "implementation",
                    &["implementation", "code", "performance", "integration", "api"],
                    "developer",
                ),
                category(
                    "security",
                    &["security", "authentication", "auth", "privacy", "vulnerability"],
                    "security",
                ),
                category(
                    "quality",
                    &["testing", "test", "quality", "bug", "reliability"],
                    "qa",
                ),
                category(
                    "requirements",
                    &["requirements", "requirement", "user", "business", "scope", "cost"],
                    "product",
                ),
            ],
            final_with_moderator: ids(&[
                "product",
                "moderator",
                "architect",
                "developer",
                "security",
                "qa",
            ]),
            final_without_moderator: ids(&["product", "architect", "developer", "security", "qa"]),
        }
    }
}

impl OrderingTables {
    /// Check the tables against `roster` and translate them to indices.
    ///
    /// Every referenced role must exist, every phase order must be a
    /// permutation of the roster's non-moderator roles, and the forced final
    /// orders must be free of duplicates (the moderator-less one must not
    /// name the moderator).
    pub fn resolve(&self, roster: &RoleRoster) -> Result<ResolvedTables, ConfigError> {
        let experts = roster.expert_indices();
        if experts.len() < MIN_ORDER_LEN {
            return Err(ConfigError::TooFewSpeakers(experts.len()));
        }
        let moderator = roster.moderator_index();
        let expert_set: BTreeSet<usize> = experts.iter().copied().collect();

        let lookup = |id: &RoleId| {
            roster
                .index_of(id)
                .ok_or_else(|| ConfigError::UnknownRole(id.to_string()))
        };
        let lookup_all = |order: &[RoleId]| order.iter().map(lookup).collect::<Result<Vec<_>, _>>();

        let phase_orders = self.phase_orders.try_map(|phase, order| {
            let resolved = lookup_all(order)?;
            let seen: BTreeSet<usize> = resolved.iter().copied().collect();
            if seen.len() != resolved.len() || seen != expert_set {
                return Err(ConfigError::NotAPermutation {
                    phase: phase.to_string(),
                });
            }
            Ok(resolved)
        })?;

        let mut issue_categories = Vec::with_capacity(self.issue_categories.len());
        for c in &self.issue_categories {
            if c.keywords.is_empty() {
                return Err(ConfigError::EmptyCategory(c.name.clone()));
            }
            issue_categories.push(IssueCategory {
                name: c.name.clone(),
                keywords: c.keywords.iter().map(|k| k.to_lowercase()).collect(),
                responsible: lookup(&c.responsible)?,
            });
        }

        let final_with_moderator = lookup_all(&self.final_with_moderator)?;
        let final_without_moderator = lookup_all(&self.final_without_moderator)?;
        for (name, order) in [
            ("final (moderator)", &final_with_moderator),
            ("final", &final_without_moderator),
        ] {
            if !validate_order(order, roster.len()) {
                return Err(ConfigError::NotAPermutation {
                    phase: name.to_string(),
                });
            }
        }
        if final_without_moderator.contains(&moderator) {
            return Err(ConfigError::NotAPermutation {
                phase: "final".to_string(),
            });
        }

        Ok(ResolvedTables {
            phase_orders,
            issue_categories,
            final_with_moderator,
            final_without_moderator,
            moderator,
            decision_maker: roster.decision_maker_index(),
            roster_size: roster.len(),
        })
    }
}

/// Ordering tables as participant indices into one roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTables {
    pub phase_orders: PhaseOrders<usize>,
    pub issue_categories: Vec<IssueCategory<usize>>,
    pub final_with_moderator: Vec<usize>,
    pub final_without_moderator: Vec<usize>,
    pub moderator: usize,
    pub decision_maker: usize,
    pub roster_size: usize,
}

impl ResolvedTables {
    pub fn base_order(&self, phase: DiscussionPhase) -> &[usize] {
        self.phase_orders.get(phase)
    }

    /// Decision-maker-first order for the forced final round
    pub fn final_order(&self, moderator_enabled: bool) -> &[usize] {
        if moderator_enabled {
            &self.final_with_moderator
        } else {
            &self.final_without_moderator
        }
    }
}

pub const MIN_ORDER_LEN: usize = 3;
pub const MAX_ORDER_LEN: usize = 6;

/// Indices within the roster, no duplicates, between 3 and 6 entries
pub fn validate_order(order: &[usize], roster_size: usize) -> bool {
    if !(MIN_ORDER_LEN..=MAX_ORDER_LEN).contains(&order.len()) {
        return false;
    }
    let mut seen = BTreeSet::new();
    order.iter().all(|&i| i < roster_size && seen.insert(i))
}
