//! Hard constraints for a single placement. Pure function of the current state.

use crate::config::{DrawConfig, ExclusivePair};
use crate::data::{CandidateCatalog, CandidateId};
use crate::draw::halves::HalfPlan;
use crate::draw::state::{Bucket, BucketId, DrawState};

#[derive(Debug, Clone, Copy)]
pub struct LegalityFilter<'f> {
    catalog: &'f CandidateCatalog,
    exclusive: Option<&'f ExclusivePair>,
    half_plan: Option<&'f HalfPlan>,
}

impl<'f> LegalityFilter<'f> {
    pub fn new(catalog: &'f CandidateCatalog, config: &'f DrawConfig) -> Self {
        Self {
            catalog,
            exclusive: config.exclusive_categories.as_ref(),
            half_plan: None,
        }
    }

    /// Also require paired candidates to land in the half the plan gives them.
    pub fn with_half_plan(mut self, plan: &'f HalfPlan) -> Self {
        self.half_plan = Some(plan);
        self
    }

    pub fn is_legal(&self, candidate: CandidateId, bucket: &Bucket<'_>) -> bool {
        let record = self.catalog.get(candidate);
        if bucket.has_tier(record.tier) || bucket.has_category(&record.category) {
            return false;
        }
        if let Some(clash) = self
            .exclusive
            .and_then(|pair| pair.counterpart(&record.category))
        {
            if bucket.has_category(clash) {
                return false;
            }
        }
        match self.half_plan.and_then(|plan| plan.required_half(candidate)) {
            Some(half) => bucket.half() == half,
            None => true,
        }
    }

    /// Legal buckets for `candidate`, in label order.
    pub fn legal_buckets(&self, candidate: CandidateId, state: &DrawState<'_>) -> Vec<BucketId> {
        state
            .bucket_ids()
            .filter(|id| self.is_legal(candidate, state.bucket(*id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Half;
    use crate::data::CandidateRecord;

    fn catalog() -> CandidateCatalog {
        CandidateCatalog::from_records(vec![
            CandidateRecord::new("Lokomotiv", "RUS", 1),
            CandidateRecord::new("Juventus", "ITA", 1),
            CandidateRecord::new("Donetsk", "UKR", 2),
            CandidateRecord::new("Napoli", "ITA", 2),
            CandidateRecord::new("Ajax", "NED", 3),
        ])
    }

    #[test]
    fn empty_state_allows_every_bucket() {
        let catalog = catalog();
        let config = DrawConfig::default();
        let state = DrawState::new(&catalog, &config);
        let filter = LegalityFilter::new(&catalog, &config);
        assert_eq!(filter.legal_buckets(CandidateId(4), &state).len(), 8);
    }

    #[test]
    fn tier_and_category_exclude_buckets() {
        let catalog = catalog();
        let config = DrawConfig::default();
        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(1), BucketId(0));
        let filter = LegalityFilter::new(&catalog, &config);

        let for_tier_mate = filter.legal_buckets(CandidateId(0), &state);
        assert!(!for_tier_mate.contains(&BucketId(0)));
        let for_compatriot = filter.legal_buckets(CandidateId(3), &state);
        assert!(!for_compatriot.contains(&BucketId(0)));
        assert_eq!(for_compatriot.len(), 7);
    }

    #[test]
    fn exclusive_categories_block_each_other_both_ways() {
        let catalog = catalog();
        let config = DrawConfig::default();
        let filter = LegalityFilter::new(&catalog, &config);

        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(0), BucketId(3));
        assert!(!filter.legal_buckets(CandidateId(2), &state).contains(&BucketId(3)));

        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(2), BucketId(5));
        assert!(!filter.legal_buckets(CandidateId(0), &state).contains(&BucketId(5)));
    }

    #[test]
    fn no_exclusive_pair_means_no_special_rule() {
        let catalog = catalog();
        let config = DrawConfig {
            exclusive_categories: None,
            ..DrawConfig::default()
        };
        let filter = LegalityFilter::new(&catalog, &config);
        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(0), BucketId(3));
        assert!(filter.legal_buckets(CandidateId(2), &state).contains(&BucketId(3)));
    }

    #[test]
    fn half_plan_restricts_paired_candidates() {
        let catalog = catalog();
        let config = DrawConfig::default();
        let state = DrawState::new(&catalog, &config);
        let mut plan = HalfPlan::unconstrained(catalog.len());
        plan.require(CandidateId(4), Half::Lower);
        let filter = LegalityFilter::new(&catalog, &config).with_half_plan(&plan);
        let legal = filter.legal_buckets(CandidateId(4), &state);
        assert_eq!(legal, (4..8).map(BucketId).collect::<Vec<_>>());
    }
}
