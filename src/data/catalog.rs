//! Typed view over candidate records. Built once per catalog load and shared read-only
//! by every draw attempt.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Draw pot. Lower numbers are drawn first.
pub type Tier = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CandidateId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub category: String,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_with: Option<String>,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>, category: impl Into<String>, tier: Tier) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            tier,
            paired_with: None,
        }
    }

    pub fn paired(mut self, partner: impl Into<String>) -> Self {
        self.paired_with = Some(partner.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CandidateCatalog {
    candidates: Vec<CandidateRecord>,
    by_name: HashMap<String, CandidateId>,
}

impl CandidateCatalog {
    /// Index records in the given order. Duplicate names resolve to their first occurrence;
    /// [crate::data::validate_catalog] reports them.
    pub fn from_records(records: Vec<CandidateRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            by_name
                .entry(record.name.clone())
                .or_insert(CandidateId(index));
        }
        Self {
            candidates: records,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    pub fn get(&self, id: CandidateId) -> &CandidateRecord {
        &self.candidates[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<CandidateId> {
        self.by_name.get(name).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        (0..self.candidates.len()).map(CandidateId)
    }

    /// Distinct tiers in ascending order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.candidates
            .iter()
            .map(|c| c.tier)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Candidates of `tier` in catalog order.
    pub fn tier_members(&self, tier: Tier) -> Vec<CandidateId> {
        self.ids().filter(|id| self.get(*id).tier == tier).collect()
    }

    pub fn partner(&self, id: CandidateId) -> Option<CandidateId> {
        self.get(id)
            .paired_with
            .as_deref()
            .and_then(|name| self.id_of(name))
    }

    /// Every symmetric pair once, lower id first, ordered by that id.
    pub fn pairs(&self) -> Vec<(CandidateId, CandidateId)> {
        self.ids()
            .filter_map(|id| {
                let partner = self.partner(id)?;
                let symmetric = self.partner(partner) == Some(id);
                (symmetric && id < partner).then_some((id, partner))
            })
            .collect()
    }
}
