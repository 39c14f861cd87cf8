//! # Feature Structures
//!
//! Rooted, reentrant attribute-value DAGs and their unification.
//!
//! A [`FeatureStructure`] owns one [`FsGraph`] arena and a root node in it.
//! Structures are independent of each other: operations that combine two of
//! them (unify, feasibility tests) either read both or copy one into the
//! other's arena first.
//!
//! ## Unification contract
//!
//! [`FsGraph::unify`] is destructive and leaves its graph unusable on
//! failure. The `FeatureStructure` level wraps it: every merge runs on a
//! scratch copy of the arena and is committed only when it succeeds, so a
//! failed unify leaves both structures exactly as they were.

pub mod graph;
pub mod spec;
pub mod tree;
pub mod view;

pub use graph::{CloneMap, Content, FsGraph, Lookup, NodeId, Shape};
pub use spec::FeatureStructureSpec;
pub use tree::FeatureTree;
pub use view::FsRef;

use crate::types::{AtomicValue, Feature, FeaturePath, PatrError};

/// A rooted feature structure owning its node arena.
#[derive(Debug)]
pub struct FeatureStructure {
    graph: FsGraph,
    root: NodeId,
}

impl FeatureStructure {
    /// The empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::atomic(AtomicValue::NULL)
    }

    /// A structure consisting of a single atom (empty for the null atom).
    #[must_use]
    pub fn atomic(atom: AtomicValue) -> Self {
        let mut graph = FsGraph::new();
        let root = graph.alloc(Content::leaf(atom));
        Self { graph, root }
    }

    /// Build a structure from its flat description.
    ///
    /// At most one value may address the empty path. Equivalences are
    /// installed in order: when only one side exists the other is made to
    /// share its node, when both exist they are unified, and when neither
    /// exists the description is rejected.
    pub fn from_spec(spec: &FeatureStructureSpec) -> Result<Self, PatrError> {
        let mut graph = FsGraph::new();
        let root = graph.alloc(Content::Empty);

        let mut root_values = spec.values().iter().filter(|(path, _)| path.is_empty());
        if let Some((_, atom)) = root_values.next() {
            if root_values.next().is_some() {
                return Err(PatrError::DuplicateRootValue);
            }
            graph.assign_atom(root, *atom)?;
        }

        for (path, atom) in spec.values().iter().filter(|(path, _)| !path.is_empty()) {
            graph.create_value(root, path, *atom)?;
        }

        for (lhs, rhs) in spec.equivalences() {
            match (
                graph.lookup(root, lhs.features()),
                graph.lookup(root, rhs.features()),
            ) {
                (Lookup::Blocked, _) | (_, Lookup::Blocked) => return Err(PatrError::AtomicNode),
                (Lookup::Found(left), Lookup::Found(right)) => {
                    if !graph.unify(left, right) {
                        return Err(PatrError::InconsistentEquivalence(
                            lhs.clone(),
                            rhs.clone(),
                        ));
                    }
                }
                (Lookup::Found(target), Lookup::Missing) => graph.link_path(root, rhs, target)?,
                (Lookup::Missing, Lookup::Found(target)) => graph.link_path(root, lhs, target)?,
                (Lookup::Missing, Lookup::Missing) => {
                    return Err(PatrError::UnresolvedEquivalence(lhs.clone(), rhs.clone()));
                }
            }
        }

        Ok(Self::compacted(&graph, root))
    }

    /// Copy the structure under `root` into a fresh arena, dropping
    /// forwarded and unreachable nodes.
    pub(crate) fn compacted(graph: &FsGraph, root: NodeId) -> Self {
        let mut fresh = FsGraph::new();
        let root = fresh.import(graph, root, &mut CloneMap::new());
        Self { graph: fresh, root }
    }

    /// The arena holding this structure.
    #[must_use]
    pub fn graph(&self) -> &FsGraph {
        &self.graph
    }

    /// The root node in [`graph`](Self::graph).
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// A read-only view of the root.
    #[must_use]
    pub fn view(&self) -> FsRef<'_> {
        self.graph.view(self.root)
    }

    // -------------------------------------------------------------------------
    // Predicates
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_atomic(&self) -> bool {
        self.view().is_atomic()
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.view().is_complex()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    #[must_use]
    pub fn is_effectively_empty(&self) -> bool {
        self.view().is_effectively_empty()
    }

    #[must_use]
    pub fn contains_empty_value(&self) -> bool {
        self.view().contains_empty_value()
    }

    #[must_use]
    pub fn atomic_value(&self) -> AtomicValue {
        self.view().atomic_value()
    }

    // -------------------------------------------------------------------------
    // Access and creation
    // -------------------------------------------------------------------------

    pub fn get(&self, feature: Feature) -> Result<Option<FsRef<'_>>, PatrError> {
        self.view().get(feature)
    }

    pub fn get_path(&self, path: &FeaturePath) -> Result<Option<FsRef<'_>>, PatrError> {
        self.view().get_path(path)
    }

    /// The root's (feature, child) pairs; empty unless the root is complex.
    pub fn features(&self) -> impl Iterator<Item = (Feature, FsRef<'_>)> + '_ {
        self.view().features()
    }

    /// Create a new atomic leaf at `path`, adding intermediate nodes.
    pub fn create_atomic_value(
        &mut self,
        path: &FeaturePath,
        atom: AtomicValue,
    ) -> Result<(), PatrError> {
        self.graph.create_value(self.root, path, atom).map(|_| ())
    }

    /// Create a new empty leaf at `path`, adding intermediate nodes.
    pub fn create_empty_value(&mut self, path: &FeaturePath) -> Result<(), PatrError> {
        self.create_atomic_value(path, AtomicValue::NULL)
    }

    /// Every leaf path with its atomic value, in path order.
    #[must_use]
    pub fn leaf_paths(&self) -> Vec<(FeaturePath, AtomicValue)> {
        self.view().leaf_paths()
    }

    /// Whether both paths exist and address one shared node.
    #[must_use]
    pub fn coindexed(&self, lhs: &FeaturePath, rhs: &FeaturePath) -> bool {
        match (self.view().lookup(lhs), self.view().lookup(rhs)) {
            (Lookup::Found(left), Lookup::Found(right)) => left.same_node(right),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Cloning
    // -------------------------------------------------------------------------

    /// Copy this structure into `target`, sharing `map` with other copies
    /// into the same arena. Returns the root of the copy.
    pub fn clone_into(&self, target: &mut FsGraph, map: &mut CloneMap) -> NodeId {
        target.import(&self.graph, self.root, map)
    }

    /// A copy keeping only the branches named in `tree`.
    #[must_use]
    pub fn selective_clone(&self, tree: &FeatureTree) -> Self {
        let mut graph = FsGraph::new();
        let root = self.selective_clone_into(&mut graph, tree, &mut CloneMap::new());
        Self { graph, root }
    }

    /// [`selective_clone`](Self::selective_clone) into a shared arena.
    pub fn selective_clone_into(
        &self,
        target: &mut FsGraph,
        tree: &FeatureTree,
        map: &mut CloneMap,
    ) -> NodeId {
        target.import_selective(&self.graph, self.root, tree, map)
    }

    // -------------------------------------------------------------------------
    // Unification
    // -------------------------------------------------------------------------

    /// Unify two structures. On success both hold the merged result; on
    /// failure neither is changed.
    pub fn unify(lhs: &mut Self, rhs: &mut Self) -> bool {
        if !lhs.unify_with(rhs) {
            return false;
        }
        *rhs = lhs.clone();
        true
    }

    /// Unify `other` into `self`. `self` is only changed on success.
    pub fn unify_with(&mut self, other: &Self) -> bool {
        let mut scratch = self.graph.clone();
        let other_root = scratch.import(&other.graph, other.root, &mut CloneMap::new());
        if !scratch.unify(self.root, other_root) {
            return false;
        }
        *self = Self::compacted(&scratch, self.root);
        true
    }

    /// Coindex two paths of this structure, creating empty placeholders for
    /// missing ones. Returns `Ok(false)` when their values do not unify, in
    /// which case `self` is unchanged.
    pub fn unify_paths(&mut self, lhs: &FeaturePath, rhs: &FeaturePath) -> Result<bool, PatrError> {
        let mut scratch = self.graph.clone();
        let left = scratch.materialize(self.root, lhs.features())?;
        let right = scratch.materialize(self.root, rhs.features())?;
        if !scratch.unify(left, right) {
            return Ok(false);
        }
        *self = Self::compacted(&scratch, self.root);
        Ok(true)
    }

    /// Cheap, sound pre-test for [`unify_with`](Self::unify_with).
    #[must_use]
    pub fn possibly_unifiable(&self, other: &Self) -> bool {
        self.view().possibly_unifiable(other.view())
    }
}

impl Default for FeatureStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FeatureStructure {
    /// Deep copy with reentrancy preserved; the copy shares nothing with `self`.
    fn clone(&self) -> Self {
        Self::compacted(&self.graph, self.root)
    }
}

// =============================================================================
// TESTS
// =============================================================================
