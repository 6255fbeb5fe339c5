use serde::Serialize;
use tracing::debug;

use crate::config::{DrawConfig, Half};
use crate::data::CandidateCatalog;
use crate::draw::dead_end::DeadEnd;
use crate::draw::halves::plan_halves;
use crate::draw::legality::LegalityFilter;
use crate::draw::rng::Rng;
use crate::draw::round::RoundDrawer;
use crate::draw::state::DrawState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAssignment {
    pub label: String,
    pub half: Half,
    /// Candidate names in draw order.
    pub members: Vec<String>,
}

/// A completed draw, buckets in label order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub seed: u64,
    pub groups: Vec<GroupAssignment>,
}

impl Assignment {
    pub fn from_state(state: &DrawState<'_>, seed: u64) -> Self {
        let catalog = state.catalog();
        let groups = state
            .buckets()
            .iter()
            .map(|bucket| GroupAssignment {
                label: bucket.label().to_string(),
                half: bucket.half(),
                members: bucket
                    .members()
                    .iter()
                    .map(|id| catalog.get(*id).name.clone())
                    .collect(),
            })
            .collect();
        Self { seed, groups }
    }

    pub fn group(&self, label: &str) -> Option<&GroupAssignment> {
        self.groups.iter().find(|group| group.label == label)
    }

    /// Label of the group holding `name`.
    pub fn group_of(&self, name: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.members.iter().any(|member| member == name))
            .map(|group| group.label.as_str())
    }
}

/// Draw every tier in ascending order into one state. The first dead end aborts the attempt.
pub fn run_draw<'a>(
    catalog: &'a CandidateCatalog,
    config: &'a DrawConfig,
    rng: &mut Rng,
) -> Result<DrawState<'a>, DeadEnd> {
    let half_plan = if config.separate_paired {
        Some(plan_halves(catalog, config, rng)?)
    } else {
        None
    };
    let mut legality = LegalityFilter::new(catalog, config);
    if let Some(plan) = &half_plan {
        legality = legality.with_half_plan(plan);
    }
    let drawer = RoundDrawer::new(legality);

    let mut state = DrawState::new(catalog, config);
    for tier in catalog.tiers() {
        drawer.draw_tier(tier, catalog.tier_members(tier), &mut state, rng)?;
        debug!(tier, placed = state.placed_count(), "tier complete");
    }
    Ok(state)
}

/// One attempt from an empty state with its own seeded random source.
pub fn attempt_draw(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    seed: u64,
) -> Result<Assignment, DeadEnd> {
    let mut rng = Rng::new(seed);
    let state = run_draw(catalog, config, &mut rng)?;
    Ok(Assignment::from_state(&state, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CandidateRecord;

    fn small_catalog() -> CandidateCatalog {
        CandidateCatalog::from_records(vec![
            CandidateRecord::new("Barcelona", "ESP", 1),
            CandidateRecord::new("Bayern", "GER", 1),
            CandidateRecord::new("Dortmund", "GER", 2),
            CandidateRecord::new("Porto", "POR", 2),
        ])
    }

    fn two_groups() -> DrawConfig {
        let mut config = DrawConfig::default();
        config.buckets = vec![config.buckets[0].clone(), config.buckets[4].clone()];
        config
    }

    #[test]
    fn draw_keeps_compatriots_apart() {
        let catalog = small_catalog();
        let config = two_groups();
        for seed in 0..32 {
            let assignment = attempt_draw(&catalog, &config, seed).expect("always solvable");
            assert_eq!(assignment.seed, seed);
            assert_ne!(assignment.group_of("Bayern"), assignment.group_of("Dortmund"));
            assert_eq!(assignment.group_of("Barcelona"), assignment.group_of("Dortmund"));
        }
    }

    #[test]
    fn members_are_listed_in_tier_order() {
        let catalog = small_catalog();
        let config = two_groups();
        let assignment = attempt_draw(&catalog, &config, 9).expect("always solvable");
        for group in &assignment.groups {
            let tiers: Vec<u8> = group
                .members
                .iter()
                .filter_map(|name| catalog.id_of(name))
                .map(|id| catalog.get(id).tier)
                .collect();
            assert_eq!(tiers, vec![1, 2]);
        }
    }

    #[test]
    fn same_seed_same_assignment() {
        let catalog = small_catalog();
        let config = two_groups();
        assert_eq!(
            attempt_draw(&catalog, &config, 77),
            attempt_draw(&catalog, &config, 77)
        );
    }
}
