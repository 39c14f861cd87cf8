//! # Constraint Sets
//!
//! A deduplicated collection of constraints, kept as three ordered sets so
//! that every query iterates deterministically.

use super::{AbsConstraint, Constraint, ConstraintRef, RelConstraint, VarConstraint};
use crate::primitives::CERTAIN;
use crate::types::SlotIndex;
use std::collections::BTreeSet;

/// Deduplicated set of absolute, relative and variable constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConstraintSet {
    abs: BTreeSet<AbsConstraint>,
    rel: BTreeSet<RelConstraint>,
    var: BTreeSet<VarConstraint>,
}

impl ConstraintSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a constraint. Returns `false` when an equal one was present.
    pub fn insert(&mut self, constraint: impl Into<Constraint>) -> bool {
        match constraint.into() {
            Constraint::Abs(c) => self.abs.insert(c),
            Constraint::Rel(c) => self.rel.insert(c),
            Constraint::Var(c) => self.var.insert(c),
        }
    }

    /// Total number of constraints.
    #[must_use]
    pub fn size(&self) -> usize {
        self.abs.len() + self.rel.len() + self.var.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn clear(&mut self) {
        self.abs.clear();
        self.rel.clear();
        self.var.clear();
    }

    /// Every slot index mentioned by any constraint.
    #[must_use]
    pub fn indices(&self) -> BTreeSet<SlotIndex> {
        self.iter().flat_map(ConstraintRef::indices).collect()
    }

    #[must_use]
    pub fn contains_index(&self, index: SlotIndex) -> bool {
        self.iter().any(|c| c.contains_index(index))
    }

    #[must_use]
    pub fn contains_root(&self) -> bool {
        self.iter().any(ConstraintRef::contains_root)
    }

    #[must_use]
    pub fn num_var_constraints(&self) -> usize {
        self.var.len()
    }

    /// Product of the maximum weights of all variable constraints: the best
    /// probability any interpretation could reach.
    #[must_use]
    pub fn max_probability(&self) -> f64 {
        self.var
            .iter()
            .map(VarConstraint::max_probability)
            .fold(CERTAIN, |acc, p| acc * p)
    }

    pub fn abs(&self) -> impl Iterator<Item = &AbsConstraint> {
        self.abs.iter()
    }

    pub fn rel(&self) -> impl Iterator<Item = &RelConstraint> {
        self.rel.iter()
    }

    pub fn var(&self) -> impl Iterator<Item = &VarConstraint> {
        self.var.iter()
    }

    /// All constraints: relative first, then absolute, then variable.
    ///
    /// Relative constraints go first so that shared structure is in place
    /// before values are checked against it.
    pub fn iter(&self) -> impl Iterator<Item = ConstraintRef<'_>> {
        self.rel
            .iter()
            .map(ConstraintRef::Rel)
            .chain(self.abs.iter().map(ConstraintRef::Abs))
            .chain(self.var.iter().map(ConstraintRef::Var))
    }
}

impl<C: Into<Constraint>> Extend<C> for ConstraintSet {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        for constraint in iter {
            self.insert(constraint);
        }
    }
}

impl<C: Into<Constraint>> FromIterator<C> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::PathTerm;
    use crate::types::{AtomicValue, Feature, FeaturePath};
    use std::collections::BTreeMap;

    fn term(index: SlotIndex, ids: &[u32]) -> PathTerm {
        PathTerm::new(index, ids.iter().copied().map(Feature).collect::<FeaturePath>())
    }

    fn var(index: SlotIndex, weights: &[(u32, f64)]) -> VarConstraint {
        let dist: BTreeMap<_, _> = weights.iter().map(|(a, p)| (AtomicValue(*a), *p)).collect();
        VarConstraint::new(term(index, &[1]), dist)
    }

    #[test]
    fn insert_deduplicates() {
        let mut set = ConstraintSet::new();

        assert!(set.insert(RelConstraint::new(term(3, &[]), term(8, &[]))));
        assert!(!set.insert(RelConstraint::new(term(8, &[]), term(3, &[]))));
        assert!(set.insert(AbsConstraint::new(term(3, &[1]), AtomicValue(1))));
        assert!(!set.insert(AbsConstraint::new(term(3, &[1]), AtomicValue(1))));
        assert_eq!(set.size(), 2);

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn indices_cover_all_shapes() {
        let set: ConstraintSet = [
            Constraint::from(RelConstraint::new(term(3, &[]), term(8, &[]))),
            Constraint::from(AbsConstraint::new(term(11, &[]), AtomicValue(2))),
            Constraint::from(var(0, &[(1, 0.5)])),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.indices().into_iter().collect::<Vec<_>>(), vec![0, 3, 8, 11]);
        assert!(set.contains_index(8));
        assert!(!set.contains_index(4));
        assert!(set.contains_root());
    }

    #[test]
    fn iteration_puts_relative_first() {
        let mut set = ConstraintSet::new();
        set.insert(var(1, &[(1, 1.0)]));
        set.insert(AbsConstraint::new(term(1, &[]), AtomicValue(1)));
        set.insert(RelConstraint::new(term(1, &[]), term(2, &[])));

        let kinds: Vec<_> = set
            .iter()
            .map(|c| match c {
                ConstraintRef::Rel(_) => "rel",
                ConstraintRef::Abs(_) => "abs",
                ConstraintRef::Var(_) => "var",
            })
            .collect();
        assert_eq!(kinds, vec!["rel", "abs", "var"]);
    }

    #[test]
    fn max_probability_is_product() {
        let mut set = ConstraintSet::new();
        assert_eq!(set.max_probability(), CERTAIN);

        set.insert(var(1, &[(1, 0.5), (2, 0.25)]));
        set.insert(var(2, &[(1, 0.5)]));
        assert_eq!(set.num_var_constraints(), 2);
        assert_eq!(set.max_probability(), 0.25);
    }

    #[test]
    fn sets_compare_by_content() {
        let a: ConstraintSet = [AbsConstraint::new(term(1, &[]), AtomicValue(1))]
            .into_iter()
            .collect();
        let mut b = ConstraintSet::new();
        b.insert(AbsConstraint::new(term(1, &[]), AtomicValue(1)));

        assert_eq!(a, b);
        assert_eq!(a.abs().count(), 1);
        assert_eq!(a.rel().count() + a.var().count(), 0);
    }
}
