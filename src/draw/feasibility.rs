//! One-ply lookahead over the candidate's legal buckets.
//!
//! A bucket survives only if, with the candidate tentatively committed there, every remaining
//! tier-mate still has a legal bucket and every bucket still missing this tier is legal for at
//! least one of them. This is not a complete solver: a tier can still dead-end deeper down.

use std::collections::BTreeSet;

use crate::data::CandidateId;
use crate::draw::legality::LegalityFilter;
use crate::draw::state::{BucketId, DrawState};

#[derive(Debug, Clone, Copy)]
pub struct FeasibilityProjector<'f> {
    legality: LegalityFilter<'f>,
}

impl<'f> FeasibilityProjector<'f> {
    pub fn new(legality: LegalityFilter<'f>) -> Self {
        Self { legality }
    }

    /// Subset of `legal` that keeps the tier completable one step ahead. `state` is mutated
    /// tentatively and always restored before returning.
    pub fn restrict(
        &self,
        candidate: CandidateId,
        legal: Vec<BucketId>,
        remaining: &[CandidateId],
        state: &mut DrawState<'_>,
    ) -> Vec<BucketId> {
        if legal.len() < 2 {
            return legal;
        }
        legal
            .into_iter()
            .filter(|bucket| {
                state.commit(candidate, *bucket);
                let keep = self.tier_stays_reachable(candidate, remaining, state);
                state.rollback(candidate, *bucket);
                keep
            })
            .collect()
    }

    fn tier_stays_reachable(
        &self,
        candidate: CandidateId,
        remaining: &[CandidateId],
        state: &DrawState<'_>,
    ) -> bool {
        let mut reachable = BTreeSet::new();
        for other in remaining.iter().filter(|other| !state.is_placed(**other)) {
            let options = self.legality.legal_buckets(*other, state);
            if options.is_empty() {
                return false;
            }
            reachable.extend(options);
        }
        let tier = state.catalog().get(candidate).tier;
        let open: BTreeSet<BucketId> = state.buckets_missing_tier(tier).collect();
        reachable == open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BucketSpec, DrawConfig, Half};
    use crate::data::{CandidateCatalog, CandidateRecord};

    fn config(labels: &[&str]) -> DrawConfig {
        let half = labels.len() / 2;
        DrawConfig {
            buckets: labels
                .iter()
                .enumerate()
                .map(|(index, label)| BucketSpec {
                    label: (*label).to_string(),
                    half: if index < half { Half::Upper } else { Half::Lower },
                })
                .collect(),
            exclusive_categories: None,
            separate_paired: false,
        }
    }

    #[test]
    fn single_legal_bucket_is_returned_untouched() {
        let catalog = CandidateCatalog::from_records(vec![CandidateRecord::new("Ajax", "NED", 1)]);
        let config = config(&["A", "B"]);
        let mut state = DrawState::new(&catalog, &config);
        let projector = FeasibilityProjector::new(LegalityFilter::new(&catalog, &config));
        let kept = projector.restrict(CandidateId(0), vec![BucketId(1)], &[], &mut state);
        assert_eq!(kept, vec![BucketId(1)]);
    }

    #[test]
    fn bucket_that_strands_a_tier_mate_is_discarded() {
        // Group A already holds a GER side, so Dortmund can only go to B. Porto must leave B free.
        let catalog = CandidateCatalog::from_records(vec![
            CandidateRecord::new("Schalke", "GER", 1),
            CandidateRecord::new("Porto", "POR", 2),
            CandidateRecord::new("Dortmund", "GER", 2),
        ]);
        let config = config(&["A", "B"]);
        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(0), BucketId(0));
        let legality = LegalityFilter::new(&catalog, &config);
        let projector = FeasibilityProjector::new(legality);

        let legal = legality.legal_buckets(CandidateId(1), &state);
        assert_eq!(legal, vec![BucketId(0), BucketId(1)]);
        let kept = projector.restrict(CandidateId(1), legal, &[CandidateId(2)], &mut state);
        assert_eq!(kept, vec![BucketId(0)]);
        assert_eq!(state.placed_count(), 1, "tentative commits are rolled back");
        assert!(!state.bucket(BucketId(1)).has_tier(2));
    }

    #[test]
    fn unreachable_open_bucket_is_discarded() {
        // Leverkusen cannot join Bayern in C. Unless Porto takes C, Leverkusen keeps an option
        // but C is left with no tier-2 candidate able to reach it.
        let catalog = CandidateCatalog::from_records(vec![
            CandidateRecord::new("Bayern", "GER", 1),
            CandidateRecord::new("Valencia", "ESP", 1),
            CandidateRecord::new("Ajax", "NED", 1),
            CandidateRecord::new("Porto", "POR", 2),
            CandidateRecord::new("Dortmund", "GER", 2),
            CandidateRecord::new("Leverkusen", "GER", 2),
        ]);
        let config = DrawConfig {
            buckets: ["A", "B", "C", "D"]
                .iter()
                .map(|label| BucketSpec {
                    label: (*label).to_string(),
                    half: if *label < "C" { Half::Upper } else { Half::Lower },
                })
                .collect(),
            exclusive_categories: None,
            separate_paired: false,
        };
        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(0), BucketId(2));
        state.commit(CandidateId(1), BucketId(3));
        state.commit(CandidateId(2), BucketId(0));
        // D already carries a tier-2 filler so only A, B and C are open for tier 2.
        state.commit(CandidateId(4), BucketId(3));
        let legality = LegalityFilter::new(&catalog, &config);
        let projector = FeasibilityProjector::new(legality);

        let legal = legality.legal_buckets(CandidateId(3), &state);
        assert_eq!(legal, vec![BucketId(0), BucketId(1), BucketId(2)]);
        let kept = projector.restrict(CandidateId(3), legal, &[CandidateId(5)], &mut state);
        assert_eq!(kept, vec![BucketId(2)]);
    }
}
