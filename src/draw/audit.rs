//! Independent re-check of a finished assignment. A successful draw must never produce a
//! violation; anything reported here is an engine bug.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use thiserror::Error;

use crate::config::DrawConfig;
use crate::data::{CandidateCatalog, Tier};
use crate::draw::orchestrator::Assignment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("group '{group}' is not configured")]
    UnknownGroup { group: String },
    #[error("group '{group}' is missing")]
    MissingGroup { group: String },
    #[error("group '{group}' holds unknown candidate '{name}'")]
    UnknownCandidate { group: String, name: String },
    #[error("'{name}' was never placed")]
    MissingCandidate { name: String },
    #[error("'{name}' was placed more than once")]
    DuplicateCandidate { name: String },
    #[error("group '{group}' holds {count} candidate(s) of tier {tier}")]
    TierCount { group: String, tier: Tier, count: usize },
    #[error("group '{group}' holds two '{category}' candidates")]
    CategoryClash { group: String, category: String },
    #[error("group '{group}' holds both exclusive categories")]
    ExclusiveClash { group: String },
    #[error("paired '{first}' and '{second}' share a half")]
    PairSameHalf { first: String, second: String },
}

pub fn audit(
    assignment: &Assignment,
    catalog: &CandidateCatalog,
    config: &DrawConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let configured: BTreeSet<&str> = config.buckets.iter().map(|b| b.label.as_str()).collect();
    let drawn: BTreeSet<&str> = assignment.groups.iter().map(|g| g.label.as_str()).collect();
    for group in configured.difference(&drawn) {
        violations.push(Violation::MissingGroup {
            group: (*group).to_string(),
        });
    }
    for group in drawn.difference(&configured) {
        violations.push(Violation::UnknownGroup {
            group: (*group).to_string(),
        });
    }

    let mut times_placed: HashMap<&str, usize> = HashMap::new();
    let tiers = catalog.tiers();
    for group in &assignment.groups {
        let mut tier_counts: HashMap<Tier, usize> = HashMap::new();
        let mut categories: BTreeSet<&str> = BTreeSet::new();
        for name in &group.members {
            *times_placed.entry(name.as_str()).or_default() += 1;
            let Some(id) = catalog.id_of(name) else {
                violations.push(Violation::UnknownCandidate {
                    group: group.label.clone(),
                    name: name.clone(),
                });
                continue;
            };
            let record = catalog.get(id);
            *tier_counts.entry(record.tier).or_default() += 1;
            if !categories.insert(record.category.as_str()) {
                violations.push(Violation::CategoryClash {
                    group: group.label.clone(),
                    category: record.category.clone(),
                });
            }
        }
        for tier in &tiers {
            let count = tier_counts.get(tier).copied().unwrap_or(0);
            if count != 1 {
                violations.push(Violation::TierCount {
                    group: group.label.clone(),
                    tier: *tier,
                    count,
                });
            }
        }
        if let Some(pair) = &config.exclusive_categories {
            if categories.contains(pair.first.as_str()) && categories.contains(pair.second.as_str())
            {
                violations.push(Violation::ExclusiveClash {
                    group: group.label.clone(),
                });
            }
        }
    }

    for record in catalog.records() {
        match times_placed.get(record.name.as_str()).copied().unwrap_or(0) {
            0 => violations.push(Violation::MissingCandidate {
                name: record.name.clone(),
            }),
            1 => {}
            _ => violations.push(Violation::DuplicateCandidate {
                name: record.name.clone(),
            }),
        }
    }

    if config.separate_paired {
        for (first, second) in catalog.pairs() {
            let first = &catalog.get(first).name;
            let second = &catalog.get(second).name;
            let half_of = |name: &str| {
                assignment
                    .group_of(name)
                    .and_then(|label| assignment.group(label))
                    .map(|group| group.half)
            };
            if let (Some(a), Some(b)) = (half_of(first), half_of(second)) {
                if a == b {
                    violations.push(Violation::PairSameHalf {
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
    }

    violations
}
