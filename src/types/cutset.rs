//! Cutset families and absorption.
//!
//! A family of cutsets is read as a Boolean formula in disjunctive normal
//! form: the system fails when every member of at least one cutset fails.
//! Two families are distinguished:
//!
//! - the empty family, which never fails (identity of OR);
//! - the family holding only the empty cutset, which always fails
//!   (identity of AND).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::entity::EntityId;

/// A set of entities failing together.
pub type Cutset = BTreeSet<EntityId>;

/// Family of cutsets in which no member is a strict superset of another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinimalCutsets(BTreeSet<Cutset>);

impl MinimalCutsets {
    /// The family that never fails.
    pub fn never() -> Self {
        Self(BTreeSet::new())
    }

    /// The family that always fails.
    pub fn always() -> Self {
        Self(BTreeSet::from([Cutset::new()]))
    }

    /// A family holding a single one-entity cutset.
    pub fn single(id: EntityId) -> Self {
        Self(BTreeSet::from([Cutset::from([id])]))
    }

    /// Build a family from arbitrary sets, applying absorption.
    pub fn from_raw<I, S, T>(sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        Self::absorb(sets.into_iter().map(|s| s.into_iter().map(Into::into).collect()))
    }

    /// Remove every set that is a superset of another retained set.
    pub fn absorb(sets: impl IntoIterator<Item = Cutset>) -> Self {
        let mut candidates: Vec<Cutset> = sets.into_iter().collect();
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        candidates.dedup();

        let mut kept: Vec<Cutset> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            // Shorter sets come first, so only they can absorb the candidate.
            if !kept.iter().any(|k| k.is_subset(&candidate)) {
                kept.push(candidate);
            }
        }
        Self(kept.into_iter().collect())
    }

    /// OR of two families.
    pub fn union(&self, other: &Self) -> Self {
        self.clone().merge(other.clone())
    }

    /// OR of two families, consuming both.
    ///
    /// Each side is already minimal, so only sets of one side can absorb
    /// sets of the other.
    pub fn merge(mut self, other: Self) -> Self {
        let incoming: Vec<Cutset> = other
            .0
            .into_iter()
            .filter(|b| !self.0.contains(b) && !self.0.iter().any(|a| a.len() < b.len() && a.is_subset(b)))
            .collect();
        if incoming.is_empty() {
            return self;
        }
        self.0
            .retain(|a| !incoming.iter().any(|b| b.len() < a.len() && b.is_subset(a)));
        self.0.extend(incoming);
        self
    }

    /// AND of two families: every pairwise union, then absorption.
    pub fn product(&self, other: &Self) -> Self {
        let mut combined = Vec::with_capacity(self.0.len() * other.0.len());
        for a in &self.0 {
            for b in &other.0 {
                combined.push(a.union(b).cloned().collect::<Cutset>());
            }
        }
        Self::absorb(combined)
    }

    /// Number of cutsets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the family is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the cutsets in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Cutset> {
        self.0.iter()
    }

    /// Check if the family holds exactly this cutset.
    pub fn contains(&self, cutset: &Cutset) -> bool {
        self.0.contains(cutset)
    }

    /// Number of cutsets containing the entity.
    pub fn occurrences(&self, id: &EntityId) -> usize {
        self.0.iter().filter(|c| c.contains(id)).count()
    }

    /// Every entity appearing in some cutset.
    pub fn entities(&self) -> BTreeSet<&EntityId> {
        self.0.iter().flatten().collect()
    }

    /// Whether no cutset is a strict superset of another.
    pub fn is_minimal(&self) -> bool {
        self.0.iter().all(|a| {
            self.0
                .iter()
                .all(|b| a == b || !(b.is_subset(a) && b.len() < a.len()))
        })
    }

    /// Consume into the underlying set.
    pub fn into_inner(self) -> BTreeSet<Cutset> {
        self.0
    }
}

impl<'a> IntoIterator for &'a MinimalCutsets {
    type Item = &'a Cutset;
    type IntoIter = std::collections::btree_set::Iter<'a, Cutset>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
