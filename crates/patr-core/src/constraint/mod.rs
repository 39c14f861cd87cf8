//! # Constraint Model
//!
//! Declarative requirements over the slots of an interpretation.
//!
//! - [`AbsConstraint`]: the value at a path is a given atom.
//! - [`RelConstraint`]: the values at two paths (possibly in different slots)
//!   unify. The pair is unordered.
//! - [`VarConstraint`]: the value at a path, if atomic, lies in a
//!   probability-weighted atom set.
//!
//! Every consumer dispatches over the shapes by matching [`ConstraintRef`],
//! so adding a shape is a compile error everywhere it is not yet handled.
//!
//! The total orders defined here exist only so that [`ConstraintSet`] can
//! deduplicate; they carry no meaning.

mod set;

pub use set::ConstraintSet;

use crate::primitives::ROOT_INDEX;
use crate::types::{AtomicValue, FeaturePath, SlotIndex};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// PATH TERM
// =============================================================================

/// A path inside one slot, written `<index path...>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathTerm {
    pub index: SlotIndex,
    pub path: FeaturePath,
}

impl PathTerm {
    #[must_use]
    pub fn new(index: SlotIndex, path: FeaturePath) -> Self {
        Self { index, path }
    }

    /// The term addressing the whole structure of a slot.
    #[must_use]
    pub fn slot(index: SlotIndex) -> Self {
        Self::new(index, FeaturePath::new())
    }
}

// =============================================================================
// CONSTRAINT SHAPES
// =============================================================================

/// "The value at `term` is `value`."
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsConstraint {
    term: PathTerm,
    value: AtomicValue,
}

impl AbsConstraint {
    #[must_use]
    pub fn new(term: PathTerm, value: AtomicValue) -> Self {
        Self { term, value }
    }

    #[must_use]
    pub fn term(&self) -> &PathTerm {
        &self.term
    }

    #[must_use]
    pub fn value(&self) -> AtomicValue {
        self.value
    }
}

/// "The values at `lhs` and `rhs` unify."
#[derive(Debug, Clone)]
pub struct RelConstraint {
    lhs: PathTerm,
    rhs: PathTerm,
}

impl RelConstraint {
    #[must_use]
    pub fn new(lhs: PathTerm, rhs: PathTerm) -> Self {
        Self { lhs, rhs }
    }

    #[must_use]
    pub fn lhs(&self) -> &PathTerm {
        &self.lhs
    }

    #[must_use]
    pub fn rhs(&self) -> &PathTerm {
        &self.rhs
    }

    /// The two terms, smaller first.
    fn sorted(&self) -> (&PathTerm, &PathTerm) {
        if self.lhs <= self.rhs {
            (&self.lhs, &self.rhs)
        } else {
            (&self.rhs, &self.lhs)
        }
    }
}

impl PartialEq for RelConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for RelConstraint {}

impl PartialOrd for RelConstraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelConstraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted().cmp(&other.sorted())
    }
}

/// "The value at `term`, if atomic, is one of these weighted atoms."
#[derive(Debug, Clone)]
pub struct VarConstraint {
    term: PathTerm,
    distribution: BTreeMap<AtomicValue, f64>,
}

impl VarConstraint {
    #[must_use]
    pub fn new(term: PathTerm, distribution: BTreeMap<AtomicValue, f64>) -> Self {
        Self { term, distribution }
    }

    #[must_use]
    pub fn term(&self) -> &PathTerm {
        &self.term
    }

    #[must_use]
    pub fn distribution(&self) -> &BTreeMap<AtomicValue, f64> {
        &self.distribution
    }

    /// Weight of `atom`, or `None` when it is outside the distribution.
    #[must_use]
    pub fn probability(&self, atom: AtomicValue) -> Option<f64> {
        self.distribution.get(&atom).copied()
    }

    /// The largest weight: an optimistic bound for an undetermined value.
    #[must_use]
    pub fn max_probability(&self) -> f64 {
        self.distribution.values().copied().fold(0.0, f64::max)
    }
}

impl PartialEq for VarConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VarConstraint {}

impl PartialOrd for VarConstraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VarConstraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term.cmp(&other.term).then_with(|| {
            for ((a, p), (b, q)) in self.distribution.iter().zip(&other.distribution) {
                let ord = a.cmp(b).then_with(|| p.total_cmp(q));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            self.distribution.len().cmp(&other.distribution.len())
        })
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// An owned constraint of any shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Constraint {
    Abs(AbsConstraint),
    Rel(RelConstraint),
    Var(VarConstraint),
}

impl Constraint {
    /// Borrow as a [`ConstraintRef`].
    #[must_use]
    pub fn borrowed(&self) -> ConstraintRef<'_> {
        match self {
            Self::Abs(c) => ConstraintRef::Abs(c),
            Self::Rel(c) => ConstraintRef::Rel(c),
            Self::Var(c) => ConstraintRef::Var(c),
        }
    }

    #[must_use]
    pub fn indices(&self) -> Vec<SlotIndex> {
        self.borrowed().indices()
    }

    #[must_use]
    pub fn contains_index(&self, index: SlotIndex) -> bool {
        self.borrowed().contains_index(index)
    }

    #[must_use]
    pub fn contains_root(&self) -> bool {
        self.borrowed().contains_root()
    }
}

impl From<AbsConstraint> for Constraint {
    fn from(c: AbsConstraint) -> Self {
        Self::Abs(c)
    }
}

impl From<RelConstraint> for Constraint {
    fn from(c: RelConstraint) -> Self {
        Self::Rel(c)
    }
}

impl From<VarConstraint> for Constraint {
    fn from(c: VarConstraint) -> Self {
        Self::Var(c)
    }
}

/// A borrowed constraint of any shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRef<'a> {
    Abs(&'a AbsConstraint),
    Rel(&'a RelConstraint),
    Var(&'a VarConstraint),
}

impl ConstraintRef<'_> {
    /// The slots this constraint mentions, ascending and without duplicates.
    #[must_use]
    pub fn indices(self) -> Vec<SlotIndex> {
        match self {
            Self::Abs(c) => vec![c.term.index],
            Self::Var(c) => vec![c.term.index],
            Self::Rel(c) => {
                let (first, second) = c.sorted();
                if first.index == second.index {
                    vec![first.index]
                } else {
                    vec![first.index, second.index]
                }
            }
        }
    }

    #[must_use]
    pub fn contains_index(self, index: SlotIndex) -> bool {
        match self {
            Self::Abs(c) => c.term.index == index,
            Self::Var(c) => c.term.index == index,
            Self::Rel(c) => c.lhs.index == index || c.rhs.index == index,
        }
    }

    /// Whether the constraint mentions [`ROOT_INDEX`].
    #[must_use]
    pub fn contains_root(self) -> bool {
        self.contains_index(ROOT_INDEX)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Feature;

    fn term(index: SlotIndex, ids: &[u32]) -> PathTerm {
        PathTerm::new(index, ids.iter().copied().map(Feature).collect())
    }

    fn weights(pairs: &[(u32, f64)]) -> BTreeMap<AtomicValue, f64> {
        pairs.iter().map(|(a, p)| (AtomicValue(*a), *p)).collect()
    }

    #[test]
    fn rel_constraint_is_unordered() {
        let forward = RelConstraint::new(term(1, &[5]), term(2, &[5]));
        let backward = RelConstraint::new(term(2, &[5]), term(1, &[5]));

        assert_eq!(forward, backward);
        assert_eq!(forward.cmp(&backward), Ordering::Equal);
        assert_eq!(backward.lhs(), &term(2, &[5]));
    }

    #[test]
    fn rel_indices_deduplicate() {
        let same_slot = Constraint::from(RelConstraint::new(term(3, &[1]), term(3, &[2])));
        let cross = Constraint::from(RelConstraint::new(term(8, &[]), term(3, &[])));

        assert_eq!(same_slot.indices(), vec![3]);
        assert_eq!(cross.indices(), vec![3, 8]);
        assert!(cross.contains_index(8));
        assert!(!cross.contains_index(0));
    }

    #[test]
    fn contains_root_checks_slot_zero() {
        let root = Constraint::from(AbsConstraint::new(term(ROOT_INDEX, &[1]), AtomicValue(1)));
        let other = Constraint::from(AbsConstraint::new(term(4, &[]), AtomicValue(1)));

        assert!(root.contains_root());
        assert!(!other.contains_root());
    }

    #[test]
    fn var_max_probability() {
        let c = VarConstraint::new(term(1, &[2]), weights(&[(1, 0.2), (2, 0.7), (3, 0.1)]));

        assert_eq!(c.max_probability(), 0.7);
        assert_eq!(c.probability(AtomicValue(3)), Some(0.1));
        assert_eq!(c.probability(AtomicValue(9)), None);
        assert_eq!(VarConstraint::new(term(1, &[]), BTreeMap::new()).max_probability(), 0.0);
    }

    #[test]
    fn var_equality_compares_weights() {
        let a = VarConstraint::new(term(1, &[2]), weights(&[(1, 0.5)]));
        let b = VarConstraint::new(term(1, &[2]), weights(&[(1, 0.5)]));
        let c = VarConstraint::new(term(1, &[2]), weights(&[(1, 0.25)]));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.cmp(&c), Ordering::Equal);
    }
}
