//! # Interpretations
//!
//! A partial assignment of structures to slots, with a probability.
//!
//! All slots of one [`Interpretation`] live in a single arena, so a
//! relative constraint that unifies paths of two slots makes them share
//! nodes exactly like reentrancy inside one structure does. An interpretation
//! whose slot map is empty has failed.
//!
//! [`PotentialInterpretation`] pairs an existing interpretation with one
//! candidate that has not been merged yet. Its quick check reads both in
//! place and never copies anything.

use crate::constraint::{
    AbsConstraint, ConstraintRef, ConstraintSet, PathTerm, RelConstraint, VarConstraint,
};
use crate::primitives::{CERTAIN, IMPOSSIBLE};
use crate::structure::{CloneMap, FeatureStructure, FsGraph, FsRef, Lookup, NodeId, Shape};
use crate::types::SlotIndex;
use std::collections::BTreeMap;

// =============================================================================
// INTERPRETATION
// =============================================================================

/// Slot index → structure, sharing one arena, plus a probability.
#[derive(Debug, Clone)]
pub struct Interpretation {
    graph: FsGraph,
    slots: BTreeMap<SlotIndex, NodeId>,
    probability: f64,
}

impl Interpretation {
    /// A single-slot interpretation holding a copy of `fs`, with probability 1.
    #[must_use]
    pub fn new(index: SlotIndex, fs: &FeatureStructure) -> Self {
        let mut graph = FsGraph::new();
        let root = fs.clone_into(&mut graph, &mut CloneMap::new());
        Self {
            graph,
            slots: BTreeMap::from([(index, root)]),
            probability: CERTAIN,
        }
    }

    /// Whether this interpretation was rejected while being built or evaluated.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.slots.is_empty()
    }

    /// Probability assigned by the last [`eval`](Self::eval).
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Number of assigned slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains_index(&self, index: SlotIndex) -> bool {
        self.slots.contains_key(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots.keys().copied()
    }

    /// The structure in slot `index`.
    #[must_use]
    pub fn get(&self, index: SlotIndex) -> Option<FsRef<'_>> {
        self.slots.get(&index).map(|node| self.graph.view(*node))
    }

    /// An independent copy of the structure in slot `index`. Sharing with
    /// other slots is not carried over.
    #[must_use]
    pub fn structure(&self, index: SlotIndex) -> Option<FeatureStructure> {
        self.slots
            .get(&index)
            .map(|node| FeatureStructure::compacted(&self.graph, *node))
    }

    /// All slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, FsRef<'_>)> {
        self.slots
            .iter()
            .map(|(index, node)| (*index, self.graph.view(*node)))
    }

    fn fail(&mut self) {
        self.slots.clear();
    }

    fn slot(&self, term: &PathTerm) -> Option<NodeId> {
        self.slots.get(&term.index).copied()
    }

    // -------------------------------------------------------------------------
    // Evaluation
    // -------------------------------------------------------------------------

    /// Check every constraint whose slots are all assigned, materializing
    /// values and coindexations as it goes, and recompute the probability.
    ///
    /// Constraints over unassigned slots pass. Only absent paths are filled
    /// in: an empty node already at an absolute or variable constraint's path
    /// fails it. Returns `false` as soon as one constraint fails; the
    /// interpretation should then be discarded.
    pub fn eval(&mut self, constraints: &ConstraintSet) -> bool {
        self.probability = CERTAIN;
        if self.is_failed() {
            return false;
        }
        constraints.iter().all(|constraint| match constraint {
            ConstraintRef::Rel(c) => self.eval_rel(c),
            ConstraintRef::Abs(c) => self.eval_abs(c),
            ConstraintRef::Var(c) => self.eval_var(c),
        })
    }

    fn eval_abs(&mut self, constraint: &AbsConstraint) -> bool {
        let term = constraint.term();
        let Some(root) = self.slot(term) else {
            return true;
        };
        match self.graph.lookup(root, term.path.features()) {
            Lookup::Found(node) => self.graph.shape(node) == Shape::Atomic(constraint.value()),
            Lookup::Missing => self
                .graph
                .create_value(root, &term.path, constraint.value())
                .is_ok(),
            Lookup::Blocked => false,
        }
    }

    fn eval_rel(&mut self, constraint: &RelConstraint) -> bool {
        let (lhs, rhs) = (constraint.lhs(), constraint.rhs());
        let (Some(lhs_root), Some(rhs_root)) = (self.slot(lhs), self.slot(rhs)) else {
            return true;
        };
        let Ok(left) = self.graph.materialize(lhs_root, lhs.path.features()) else {
            return false;
        };
        let Ok(right) = self.graph.materialize(rhs_root, rhs.path.features()) else {
            return false;
        };
        if self.graph.unify(left, right) {
            true
        } else {
            self.fail();
            false
        }
    }

    fn eval_var(&mut self, constraint: &VarConstraint) -> bool {
        let term = constraint.term();
        let Some(root) = self.slot(term) else {
            return true;
        };
        let weight = match self.graph.lookup(root, term.path.features()) {
            Lookup::Missing => Some(constraint.max_probability()),
            Lookup::Blocked => return false,
            Lookup::Found(node) => match self.graph.shape(node) {
                Shape::Atomic(atom) => constraint.probability(atom),
                Shape::Empty | Shape::Complex => return false,
            },
        };
        match weight {
            Some(p) => {
                self.probability *= p;
                true
            }
            None => {
                self.probability = IMPOSSIBLE;
                false
            }
        }
    }
}

impl From<PotentialInterpretation<'_>> for Interpretation {
    /// Copy every slot of the base through one shared clone map (keeping
    /// cross-slot sharing), copy the candidate, then add it to its slot or
    /// unify it with what is already there.
    fn from(potential: PotentialInterpretation<'_>) -> Self {
        let base = potential.base;
        let mut graph = FsGraph::new();
        let mut map = CloneMap::new();
        let slots: BTreeMap<_, _> = base
            .slots
            .iter()
            .map(|(index, node)| (*index, graph.import(&base.graph, *node, &mut map)))
            .collect();
        let candidate = potential
            .candidate
            .clone_into(&mut graph, &mut CloneMap::new());

        let mut interpretation = Self {
            graph,
            slots,
            probability: base.probability,
        };
        match interpretation.slots.get(&potential.index).copied() {
            None => {
                interpretation.slots.insert(potential.index, candidate);
            }
            Some(existing) => {
                if !interpretation.graph.unify(existing, candidate) {
                    interpretation.fail();
                }
            }
        }
        interpretation
    }
}

// =============================================================================
// POTENTIAL INTERPRETATION
// =============================================================================

/// An interpretation plus one candidate for one slot, not yet merged.
#[derive(Debug, Clone, Copy)]
pub struct PotentialInterpretation<'a> {
    base: &'a Interpretation,
    index: SlotIndex,
    candidate: &'a FeatureStructure,
}

impl<'a> PotentialInterpretation<'a> {
    #[must_use]
    pub fn new(base: &'a Interpretation, index: SlotIndex, candidate: &'a FeatureStructure) -> Self {
        Self {
            base,
            index,
            candidate,
        }
    }

    #[must_use]
    pub fn base(&self) -> &'a Interpretation {
        self.base
    }

    #[must_use]
    pub fn index(&self) -> SlotIndex {
        self.index
    }

    #[must_use]
    pub fn candidate(&self) -> &'a FeatureStructure {
        self.candidate
    }

    /// Cheap feasibility test for merging the candidate.
    ///
    /// Never rejects a pairing whose full [`Interpretation::eval`] would pass.
    /// When the slot is already assigned only the two structures are
    /// compared. Otherwise every constraint mentioning the slot is checked
    /// against the candidate in place.
    #[must_use]
    pub fn quick_check(&self, constraints: &ConstraintSet) -> bool {
        if let Some(existing) = self.base.get(self.index) {
            return existing.possibly_unifiable(self.candidate.view());
        }
        constraints
            .iter()
            .filter(|constraint| constraint.contains_index(self.index))
            .all(|constraint| match constraint {
                ConstraintRef::Abs(c) => self.check_abs(c),
                ConstraintRef::Rel(c) => self.check_rel(c),
                ConstraintRef::Var(c) => self.check_var(c),
            })
    }

    fn check_abs(&self, constraint: &AbsConstraint) -> bool {
        match self.candidate.view().lookup(&constraint.term().path) {
            Lookup::Found(node) if node.is_atomic() => node.atomic_value() == constraint.value(),
            Lookup::Found(node) => !node.is_complex(),
            Lookup::Missing => true,
            Lookup::Blocked => false,
        }
    }

    fn check_var(&self, constraint: &VarConstraint) -> bool {
        match self.candidate.view().lookup(&constraint.term().path) {
            Lookup::Found(node) if node.is_atomic() => {
                constraint.probability(node.atomic_value()).is_some()
            }
            Lookup::Found(node) => !node.is_complex(),
            Lookup::Missing => true,
            Lookup::Blocked => false,
        }
    }

    fn check_rel(&self, constraint: &RelConstraint) -> bool {
        let (lhs, rhs) = (constraint.lhs(), constraint.rhs());
        let candidate = self.candidate.view();
        let (own, other) = if lhs.index == self.index {
            (lhs, rhs)
        } else {
            (rhs, lhs)
        };
        let other_root = if other.index == self.index {
            candidate
        } else {
            match self.base.get(other.index) {
                Some(root) => root,
                None => return true,
            }
        };
        match (candidate.lookup(&own.path), other_root.lookup(&other.path)) {
            (Lookup::Blocked, _) | (_, Lookup::Blocked) => false,
            (Lookup::Found(left), Lookup::Found(right)) => left.possibly_unifiable(right),
            _ => true,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::structure::FeatureStructureSpec;
    use crate::types::{AtomicValue, Feature, FeaturePath};

    const A: Feature = Feature(1);
    const B: Feature = Feature(2);
    const X: AtomicValue = AtomicValue(10);
    const Y: AtomicValue = AtomicValue(11);

    fn path(features: &[Feature]) -> FeaturePath {
        FeaturePath::from(features)
    }

    fn term(index: SlotIndex, features: &[Feature]) -> PathTerm {
        PathTerm::new(index, path(features))
    }

    fn fs(values: &[(&[Feature], AtomicValue)]) -> FeatureStructure {
        let spec = values
            .iter()
            .fold(FeatureStructureSpec::new(), |spec, (p, atom)| {
                spec.with_value(path(p), *atom)
            });
        FeatureStructure::from_spec(&spec).expect("valid structure")
    }

    fn constraints(items: Vec<Constraint>) -> ConstraintSet {
        items.into_iter().collect()
    }

    #[test]
    fn seed_has_certain_probability() {
        let interp = Interpretation::new(3, &fs(&[(&[A], X)]));

        assert!(!interp.is_failed());
        assert_eq!(interp.probability(), CERTAIN);
        assert_eq!(interp.indices().collect::<Vec<_>>(), vec![3]);
        assert!(interp.get(4).is_none());
    }

    #[test]
    fn abs_materializes_missing_value() {
        let mut interp = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![
            AbsConstraint::new(term(1, &[B]), Y).into(),
            AbsConstraint::new(term(2, &[B]), X).into(),
        ]);

        assert!(interp.eval(&cs));
        let slot = interp.structure(1).expect("slot");
        assert_eq!(slot.leaf_paths(), vec![(path(&[A]), X), (path(&[B]), Y)]);
    }

    #[test]
    fn abs_mismatch_fails() {
        let mut interp = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![AbsConstraint::new(term(1, &[A]), Y).into()]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn rel_coindexes_across_slots() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let candidate = fs(&[(&[B], Y)]);
        let mut interp = Interpretation::from(PotentialInterpretation::new(&base, 2, &candidate));
        let cs = constraints(vec![RelConstraint::new(term(1, &[]), term(2, &[])).into()]);

        assert!(interp.eval(&cs));
        let left = interp.get(1).expect("slot 1");
        let right = interp.get(2).expect("slot 2");
        assert!(left.same_node(right));
        assert_eq!(left.leaf_paths(), vec![(path(&[A]), X), (path(&[B]), Y)]);
    }

    #[test]
    fn rel_clash_clears_slots() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let candidate = fs(&[(&[A], Y)]);
        let mut interp = Interpretation::from(PotentialInterpretation::new(&base, 2, &candidate));
        let cs = constraints(vec![RelConstraint::new(term(1, &[A]), term(2, &[A])).into()]);

        assert!(!interp.eval(&cs));
        assert!(interp.is_failed());
    }

    #[test]
    fn merging_into_occupied_slot_unifies() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let compatible = fs(&[(&[B], Y)]);
        let clashing = fs(&[(&[A], Y)]);

        let merged = Interpretation::from(PotentialInterpretation::new(&base, 1, &compatible));
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.structure(1).expect("slot").leaf_paths(),
            vec![(path(&[A]), X), (path(&[B]), Y)]
        );

        let failed = Interpretation::from(PotentialInterpretation::new(&base, 1, &clashing));
        assert!(failed.is_failed());
    }

    #[test]
    fn var_weights_multiply() {
        let weights = BTreeMap::from([(X, 0.5), (Y, 0.25)]);
        let mut interp = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![
            VarConstraint::new(term(1, &[A]), weights.clone()).into(),
            VarConstraint::new(term(1, &[B]), weights).into(),
        ]);

        assert!(interp.eval(&cs));
        assert_eq!(interp.probability(), 0.25);
    }

    #[test]
    fn var_outside_distribution_is_impossible() {
        let mut interp = Interpretation::new(1, &fs(&[(&[A], Y)]));
        let cs = constraints(vec![
            VarConstraint::new(term(1, &[A]), BTreeMap::from([(X, 1.0)])).into(),
        ]);

        assert!(!interp.eval(&cs));
        assert_eq!(interp.probability(), IMPOSSIBLE);
    }

    fn with_placeholder() -> FeatureStructure {
        let mut placeholder = FeatureStructure::new();
        placeholder.create_empty_value(&path(&[A])).expect("create");
        placeholder
    }

    #[test]
    fn abs_on_empty_placeholder_fails() {
        let mut interp = Interpretation::new(1, &with_placeholder());
        let cs = constraints(vec![AbsConstraint::new(term(1, &[A]), X).into()]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn var_on_empty_placeholder_fails() {
        let mut interp = Interpretation::new(1, &with_placeholder());
        let cs = constraints(vec![
            VarConstraint::new(term(1, &[A]), BTreeMap::from([(X, 0.4)])).into(),
        ]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn abs_after_rel_placeholder_fails() {
        let base = Interpretation::new(1, &fs(&[(&[B], X)]));
        let candidate = fs(&[(&[B], X)]);
        let mut interp = Interpretation::from(PotentialInterpretation::new(&base, 2, &candidate));
        let cs = constraints(vec![
            RelConstraint::new(term(1, &[A]), term(2, &[A])).into(),
            AbsConstraint::new(term(1, &[A]), X).into(),
        ]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn abs_on_complex_target_fails() {
        let mut interp = Interpretation::new(1, &fs(&[(&[A, B], X)]));
        let cs = constraints(vec![AbsConstraint::new(term(1, &[A]), X).into()]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn var_on_complex_target_fails() {
        let mut interp = Interpretation::new(1, &fs(&[(&[A, B], X)]));
        let cs = constraints(vec![
            VarConstraint::new(term(1, &[A]), BTreeMap::from([(X, 1.0)])).into(),
        ]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn rel_through_atom_fails() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let candidate = fs(&[(&[B], Y)]);
        let mut interp = Interpretation::from(PotentialInterpretation::new(&base, 2, &candidate));
        let cs = constraints(vec![RelConstraint::new(term(1, &[A, B]), term(2, &[B])).into()]);

        assert!(!interp.eval(&cs));
    }

    #[test]
    fn quick_check_rejects_clashing_candidates() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![
            RelConstraint::new(term(1, &[A]), term(2, &[A])).into(),
            AbsConstraint::new(term(2, &[B]), X).into(),
        ]);

        let good = fs(&[(&[A], X)]);
        let rel_clash = fs(&[(&[A], Y)]);
        let abs_clash = fs(&[(&[B], Y)]);

        assert!(PotentialInterpretation::new(&base, 2, &good).quick_check(&cs));
        assert!(!PotentialInterpretation::new(&base, 2, &rel_clash).quick_check(&cs));
        assert!(!PotentialInterpretation::new(&base, 2, &abs_clash).quick_check(&cs));
    }

    #[test]
    fn quick_check_passes_when_other_slot_is_unassigned() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![RelConstraint::new(term(2, &[A]), term(5, &[A])).into()]);
        let candidate = fs(&[(&[A], Y)]);

        assert!(PotentialInterpretation::new(&base, 2, &candidate).quick_check(&cs));
    }

    #[test]
    fn quick_check_on_occupied_slot_ignores_constraints() {
        let base = Interpretation::new(1, &fs(&[(&[A], X)]));
        let cs = constraints(vec![AbsConstraint::new(term(1, &[B]), X).into()]);
        let candidate = fs(&[(&[B], Y)]);
        let potential = PotentialInterpretation::new(&base, 1, &candidate);

        assert!(potential.quick_check(&cs));
        assert_eq!(potential.index(), 1);
        assert!(std::ptr::eq(potential.base(), &base));
        assert!(std::ptr::eq(potential.candidate(), &candidate));
    }
}
