use serde::Serialize;
use thiserror::Error;

use crate::data::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DeadEndReason {
    /// Hard constraints left the candidate no bucket at all.
    #[error("no legal bucket")]
    NoLegalBucket,
    /// Every legal bucket would strand a remaining tier-mate.
    #[error("every legal bucket strands a tier-mate")]
    ProjectionExhausted,
    /// Designated pairs could not be split across halves.
    #[error("pairs cannot be split across halves")]
    HalfPlanInfeasible,
}

/// The only failure of a draw attempt. The attempt is discarded whole; callers retry with a
/// fresh seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("dead end: {reason}{} after {placed} placement(s)", location(.candidate, .tier))]
pub struct DeadEnd {
    pub reason: DeadEndReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    /// Candidates committed before the attempt stopped.
    pub placed: usize,
}

impl DeadEnd {
    pub fn stranded(reason: DeadEndReason, tier: Tier, candidate: &str, placed: usize) -> Self {
        Self {
            reason,
            tier: Some(tier),
            candidate: Some(candidate.to_string()),
            placed,
        }
    }

    pub fn half_plan() -> Self {
        Self {
            reason: DeadEndReason::HalfPlanInfeasible,
            tier: None,
            candidate: None,
            placed: 0,
        }
    }
}

fn location(candidate: &Option<String>, tier: &Option<Tier>) -> String {
    let mut out = String::new();
    if let Some(candidate) = candidate {
        out.push_str(&format!(" for '{candidate}'"));
    }
    if let Some(tier) = tier {
        out.push_str(&format!(" in tier {tier}"));
    }
    out
}
