use tracing::{debug, trace};

use crate::data::{CandidateId, Tier};
use crate::draw::dead_end::{DeadEnd, DeadEndReason};
use crate::draw::feasibility::FeasibilityProjector;
use crate::draw::legality::LegalityFilter;
use crate::draw::rng::Rng;
use crate::draw::state::DrawState;

/// Draws one tier: random candidate, filtered buckets, random bucket, commit. Repeat.
#[derive(Debug, Clone, Copy)]
pub struct RoundDrawer<'f> {
    legality: LegalityFilter<'f>,
    projector: FeasibilityProjector<'f>,
}

impl<'f> RoundDrawer<'f> {
    pub fn new(legality: LegalityFilter<'f>) -> Self {
        Self {
            legality,
            projector: FeasibilityProjector::new(legality),
        }
    }

    pub fn draw_tier(
        &self,
        tier: Tier,
        candidates: Vec<CandidateId>,
        state: &mut DrawState<'_>,
        rng: &mut Rng,
    ) -> Result<(), DeadEnd> {
        let mut pending = candidates;
        while !pending.is_empty() {
            let picked = pending.remove(rng.below(pending.len()));
            let name = state.catalog().get(picked).name.as_str();

            let legal = self.legality.legal_buckets(picked, state);
            if legal.is_empty() {
                debug!(tier, candidate = name, placed = state.placed_count(), "no legal bucket");
                return Err(DeadEnd::stranded(
                    DeadEndReason::NoLegalBucket,
                    tier,
                    name,
                    state.placed_count(),
                ));
            }

            let options = self.projector.restrict(picked, legal, &pending, state);
            if options.is_empty() {
                debug!(tier, candidate = name, placed = state.placed_count(), "projection left no bucket");
                return Err(DeadEnd::stranded(
                    DeadEndReason::ProjectionExhausted,
                    tier,
                    name,
                    state.placed_count(),
                ));
            }

            let bucket = options[rng.below(options.len())];
            trace!(
                tier,
                candidate = name,
                bucket = state.bucket(bucket).label(),
                options = options.len(),
                "placed"
            );
            state.commit(picked, bucket);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrawConfig;
    use crate::data::{CandidateCatalog, CandidateRecord};

    fn tier_one() -> CandidateCatalog {
        let records = ["ESP", "GER", "ENG", "ITA", "FRA", "RUS", "POR", "NED"]
            .iter()
            .enumerate()
            .map(|(index, category)| CandidateRecord::new(format!("Seed {index}"), *category, 1))
            .collect();
        CandidateCatalog::from_records(records)
    }

    #[test]
    fn tier_fills_every_bucket_once() {
        let catalog = tier_one();
        let config = DrawConfig::default();
        let mut state = DrawState::new(&catalog, &config);
        let drawer = RoundDrawer::new(LegalityFilter::new(&catalog, &config));
        drawer
            .draw_tier(1, catalog.tier_members(1), &mut state, &mut Rng::new(11))
            .expect("an unconstrained tier always completes");
        assert!(state.buckets().iter().all(|bucket| bucket.len() == 1));
        assert_eq!(state.placed_count(), 8);
    }

    #[test]
    fn candidate_without_legal_bucket_is_a_dead_end() {
        let catalog = CandidateCatalog::from_records(vec![
            CandidateRecord::new("Bayern", "GER", 1),
            CandidateRecord::new("Juventus", "ITA", 1),
            CandidateRecord::new("Dortmund", "GER", 2),
            CandidateRecord::new("Schalke", "GER", 2),
        ]);
        let config = DrawConfig {
            buckets: DrawConfig::default().buckets.into_iter().take(2).collect(),
            ..DrawConfig::default()
        };
        let mut state = DrawState::new(&catalog, &config);
        let drawer = RoundDrawer::new(LegalityFilter::new(&catalog, &config));
        drawer
            .draw_tier(1, catalog.tier_members(1), &mut state, &mut Rng::new(3))
            .expect("tier one has no conflicts");

        // Two GER sides for the one bucket without Bayern.
        let err = drawer
            .draw_tier(2, catalog.tier_members(2), &mut state, &mut Rng::new(3))
            .expect_err("second GER side has nowhere to go");
        assert_eq!(err.tier, Some(2));
        assert_eq!(err.reason, DeadEndReason::NoLegalBucket);
        assert_eq!(err.placed, 3);
    }
}
