//! Two-phase half separation for designated pairs.
//!
//! Phase one (here) splits every pair across the two halves with a small randomized
//! backtracking search. Phase two is the ordinary draw, with the plan folded into the
//! [crate::draw::LegalityFilter]. Forced members per tier and per category in a half never
//! exceed the half size, since each bucket takes one candidate of each.

use std::collections::HashMap;

use tracing::debug;

use crate::config::{DrawConfig, Half};
use crate::data::{CandidateCatalog, CandidateId, Tier};
use crate::draw::dead_end::DeadEnd;
use crate::draw::rng::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfPlan {
    halves: Vec<Option<Half>>,
}

impl HalfPlan {
    pub fn unconstrained(candidate_count: usize) -> Self {
        Self {
            halves: vec![None; candidate_count],
        }
    }

    pub fn require(&mut self, candidate: CandidateId, half: Half) {
        self.halves[candidate.0] = Some(half);
    }

    pub fn required_half(&self, candidate: CandidateId) -> Option<Half> {
        self.halves[candidate.0]
    }

    pub fn constrained_count(&self) -> usize {
        self.halves.iter().filter(|h| h.is_some()).count()
    }
}

pub fn plan_halves(
    catalog: &CandidateCatalog,
    config: &DrawConfig,
    rng: &mut Rng,
) -> Result<HalfPlan, DeadEnd> {
    let mut search = HalfSearch {
        catalog,
        pairs: catalog.pairs(),
        capacity: config.half_size(Half::Upper),
        tier_load: HashMap::new(),
        category_load: HashMap::new(),
        plan: HalfPlan::unconstrained(catalog.len()),
    };
    if search.assign(0, rng) {
        debug!(
            pairs = search.pairs.len(),
            constrained = search.plan.constrained_count(),
            "half plan found"
        );
        Ok(search.plan)
    } else {
        debug!(pairs = search.pairs.len(), "no half plan splits every pair");
        Err(DeadEnd::half_plan())
    }
}

struct HalfSearch<'a> {
    catalog: &'a CandidateCatalog,
    pairs: Vec<(CandidateId, CandidateId)>,
    capacity: usize,
    tier_load: HashMap<(Tier, Half), usize>,
    category_load: HashMap<(&'a str, Half), usize>,
    plan: HalfPlan,
}

impl<'a> HalfSearch<'a> {
    fn assign(&mut self, index: usize, rng: &mut Rng) -> bool {
        let Some(&(first, second)) = self.pairs.get(index) else {
            return true;
        };
        let preferred = if rng.coin() { Half::Upper } else { Half::Lower };
        for half in [preferred, preferred.opposite()] {
            if !self.fits(first, half) || !self.fits(second, half.opposite()) {
                continue;
            }
            self.place(first, half, 1);
            self.place(second, half.opposite(), 1);
            if self.assign(index + 1, rng) {
                return true;
            }
            self.place(first, half, -1);
            self.place(second, half.opposite(), -1);
        }
        false
    }

    fn fits(&self, candidate: CandidateId, half: Half) -> bool {
        let record = self.catalog.get(candidate);
        let tier = self.tier_load.get(&(record.tier, half)).copied().unwrap_or(0);
        let category = self
            .category_load
            .get(&(record.category.as_str(), half))
            .copied()
            .unwrap_or(0);
        tier < self.capacity && category < self.capacity
    }

    fn place(&mut self, candidate: CandidateId, half: Half, delta: isize) {
        let record = self.catalog.get(candidate);
        let tier = self.tier_load.entry((record.tier, half)).or_default();
        *tier = tier.saturating_add_signed(delta);
        let category = self
            .category_load
            .entry((record.category.as_str(), half))
            .or_default();
        *category = category.saturating_add_signed(delta);
        if delta > 0 {
            self.plan.require(candidate, half);
        } else {
            self.plan.halves[candidate.0] = None;
        }
    }
}
