//! Mutable draw state for one attempt. Lookahead commits tentatively and rolls back in place,
//! so the state is never cloned during a draw.

use crate::config::{DrawConfig, Half};
use crate::data::{CandidateCatalog, CandidateId, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketId(pub usize);

#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    label: &'a str,
    half: Half,
    members: Vec<CandidateId>,
    categories: Vec<&'a str>,
    tiers: Vec<Tier>,
}

impl<'a> Bucket<'a> {
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn half(&self) -> Half {
        self.half
    }

    /// Committed candidates in draw order.
    pub fn members(&self) -> &[CandidateId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_tier(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(&category)
    }
}

#[derive(Debug, Clone)]
pub struct DrawState<'a> {
    catalog: &'a CandidateCatalog,
    buckets: Vec<Bucket<'a>>,
    placements: Vec<Option<BucketId>>,
}

impl<'a> DrawState<'a> {
    /// Empty buckets in lexical label order; every candidate unplaced.
    pub fn new(catalog: &'a CandidateCatalog, config: &'a DrawConfig) -> Self {
        let buckets = config
            .sorted_buckets()
            .into_iter()
            .map(|spec| Bucket {
                label: spec.label.as_str(),
                half: spec.half,
                members: Vec::new(),
                categories: Vec::new(),
                tiers: Vec::new(),
            })
            .collect();
        Self {
            catalog,
            buckets,
            placements: vec![None; catalog.len()],
        }
    }

    pub fn catalog(&self) -> &'a CandidateCatalog {
        self.catalog
    }

    pub fn buckets(&self) -> &[Bucket<'a>] {
        &self.buckets
    }

    pub fn bucket(&self, id: BucketId) -> &Bucket<'a> {
        &self.buckets[id.0]
    }

    pub fn bucket_ids(&self) -> impl Iterator<Item = BucketId> {
        (0..self.buckets.len()).map(BucketId)
    }

    pub fn placement(&self, candidate: CandidateId) -> Option<BucketId> {
        self.placements[candidate.0]
    }

    pub fn is_placed(&self, candidate: CandidateId) -> bool {
        self.placements[candidate.0].is_some()
    }

    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_some()).count()
    }

    /// Buckets that still need a candidate of `tier`, in label order.
    pub fn buckets_missing_tier(&self, tier: Tier) -> impl Iterator<Item = BucketId> + '_ {
        self.bucket_ids()
            .filter(move |id| !self.buckets[id.0].has_tier(tier))
    }

    pub fn commit(&mut self, candidate: CandidateId, bucket: BucketId) {
        let record = self.catalog.get(candidate);
        let target = &mut self.buckets[bucket.0];
        target.members.push(candidate);
        target.categories.push(record.category.as_str());
        target.tiers.push(record.tier);
        self.placements[candidate.0] = Some(bucket);
    }

    /// Undo a [DrawState::commit]. Rollbacks are expected in reverse commit order.
    pub fn rollback(&mut self, candidate: CandidateId, bucket: BucketId) {
        let target = &mut self.buckets[bucket.0];
        debug_assert_eq!(target.members.last(), Some(&candidate));
        if let Some(position) = target.members.iter().rposition(|m| *m == candidate) {
            target.members.remove(position);
            target.categories.remove(position);
            target.tiers.remove(position);
            self.placements[candidate.0] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CandidateRecord;

    fn catalog() -> CandidateCatalog {
        CandidateCatalog::from_records(vec![
            CandidateRecord::new("Bayern", "GER", 1),
            CandidateRecord::new("Porto", "POR", 2),
        ])
    }

    #[test]
    fn buckets_are_ordered_by_label() {
        let catalog = catalog();
        let mut config = DrawConfig::default();
        config.buckets.reverse();
        let state = DrawState::new(&catalog, &config);
        let labels: Vec<&str> = state.buckets().iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D", "E", "F", "G", "H"]);
        assert_eq!(state.bucket(BucketId(0)).half(), Half::Upper);
        assert_eq!(state.bucket(BucketId(7)).half(), Half::Lower);
    }

    #[test]
    fn commit_then_rollback_restores_state() {
        let catalog = catalog();
        let config = DrawConfig::default();
        let mut state = DrawState::new(&catalog, &config);
        state.commit(CandidateId(0), BucketId(2));
        assert!(state.bucket(BucketId(2)).has_category("GER"));
        assert!(state.bucket(BucketId(2)).has_tier(1));
        assert_eq!(state.placement(CandidateId(0)), Some(BucketId(2)));
        assert_eq!(state.buckets_missing_tier(1).count(), 7);

        state.commit(CandidateId(1), BucketId(2));
        state.rollback(CandidateId(1), BucketId(2));
        assert_eq!(state.bucket(BucketId(2)).members(), &[CandidateId(0)]);
        assert!(!state.bucket(BucketId(2)).has_category("POR"));
        assert!(!state.is_placed(CandidateId(1)));
        assert_eq!(state.placed_count(), 1);
    }
}
