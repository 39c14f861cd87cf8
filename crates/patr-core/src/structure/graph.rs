//! # Feature Graph Arena
//!
//! Storage for reentrant feature structures.
//!
//! Nodes live in a contiguous arena and refer to each other by [`NodeId`].
//! A node is either content-bearing (empty, atomic, or complex) or forwarding:
//! unification never relocates a node, it redirects one side to the other.
//! Forwarding chains are collapsed on every mutable access (path compression);
//! read-only access follows them without rewriting.
//!
//! ## Invariants
//!
//! - The graph reachable from any node is acyclic. Callers must present
//!   acyclic input; nothing here detects cycles.
//! - A forwarding node has `Content::Empty`; its content was discarded when
//!   it was redirected and the forward target is authoritative.
//! - A complex node never has an empty feature map.

use super::tree::FeatureTree;
use super::view::FsRef;
use crate::types::{AtomicValue, Feature, FeaturePath, PatrError};
use std::collections::BTreeMap;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Index of a node inside one [`FsGraph`].
///
/// A `NodeId` is only meaningful together with the graph that issued it.
/// It is the node's position in the arena, so it covers every index a `Vec`
/// can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in its arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Memo of already-cloned nodes: source node → copy in the destination graph.
///
/// Sharing one map across several imports into the same destination graph
/// reproduces every coindexation exactly once.
pub type CloneMap = BTreeMap<NodeId, NodeId>;

// =============================================================================
// NODE CONTENT
// =============================================================================

/// What a content-bearing node holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    /// No atom and no features.
    #[default]
    Empty,
    /// A non-null atomic value.
    Atomic(AtomicValue),
    /// A non-empty feature → child mapping.
    Complex(BTreeMap<Feature, NodeId>),
}

impl Content {
    /// Leaf content for an atom; the null atom yields an empty leaf.
    #[must_use]
    pub fn leaf(atom: AtomicValue) -> Self {
        if atom.is_null() {
            Self::Empty
        } else {
            Self::Atomic(atom)
        }
    }
}

/// Copyable summary of a node's content, used to branch without holding a borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Empty,
    Atomic(AtomicValue),
    Complex,
}

/// Outcome of following a path without creating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The path leads to this node.
    Found(T),
    /// Some feature on the path is absent.
    Missing,
    /// The path runs into an atomic value before it ends.
    Blocked,
}

impl<T> Lookup<T> {
    /// Map the found value, keeping `Missing`/`Blocked` as they are.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Missing => Lookup::Missing,
            Self::Blocked => Lookup::Blocked,
        }
    }

    /// Convert to the `Get` contract: blocked paths are precondition violations.
    pub fn into_result(self) -> Result<Option<T>, PatrError> {
        match self {
            Self::Found(value) => Ok(Some(value)),
            Self::Missing => Ok(None),
            Self::Blocked => Err(PatrError::AtomicNode),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    content: Content,
    forward: Option<NodeId>,
}

// =============================================================================
// GRAPH
// =============================================================================

/// Arena of feature structure nodes.
#[derive(Debug, Clone, Default)]
pub struct FsGraph {
    slots: Vec<Slot>,
}

impl FsGraph {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated nodes, including forwarded ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether no node has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocate a new content-bearing node.
    pub fn alloc(&mut self, content: Content) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            content,
            forward: None,
        });
        id
    }

    /// A read-only view of `node`.
    #[must_use]
    pub fn view(&self, node: NodeId) -> FsRef<'_> {
        FsRef::new(self, node)
    }

    // -------------------------------------------------------------------------
    // Forwarding
    // -------------------------------------------------------------------------

    /// Follow the forwarding chain from `node` to its authoritative node.
    #[must_use]
    pub fn resolve(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(next) = self.slots[current.index()].forward {
            current = next;
        }
        current
    }

    /// Like [`resolve`](Self::resolve), but rewrites every node on the chain
    /// to point directly at the end of it.
    pub fn dechain(&mut self, node: NodeId) -> NodeId {
        let target = self.resolve(node);
        let mut current = node;
        while current != target {
            let next = self.slots[current.index()].forward.unwrap_or(target);
            self.slots[current.index()].forward = Some(target);
            current = next;
        }
        target
    }

    /// Turn `from` into a forwarding node pointing at `to`, discarding its content.
    fn redirect(&mut self, from: NodeId, to: NodeId) {
        let slot = &mut self.slots[from.index()];
        slot.content = Content::Empty;
        slot.forward = Some(to);
    }

    // -------------------------------------------------------------------------
    // Content access
    // -------------------------------------------------------------------------

    /// Content of the node `node` forwards to.
    #[must_use]
    pub fn content(&self, node: NodeId) -> &Content {
        &self.slots[self.resolve(node).index()].content
    }

    /// Copyable summary of the dereferenced content.
    #[must_use]
    pub fn shape(&self, node: NodeId) -> Shape {
        match self.content(node) {
            Content::Empty => Shape::Empty,
            Content::Atomic(atom) => Shape::Atomic(*atom),
            Content::Complex(_) => Shape::Complex,
        }
    }

    /// The child under `feature`, if `node` is complex and has one.
    #[must_use]
    pub fn child(&self, node: NodeId, feature: Feature) -> Option<NodeId> {
        match self.content(node) {
            Content::Complex(children) => children.get(&feature).copied(),
            Content::Empty | Content::Atomic(_) => None,
        }
    }

    /// Follow `path` from `node` without creating anything.
    #[must_use]
    pub fn lookup(&self, node: NodeId, path: &[Feature]) -> Lookup<NodeId> {
        let mut current = self.resolve(node);
        for feature in path {
            match self.content(current) {
                Content::Atomic(_) => return Lookup::Blocked,
                Content::Empty => return Lookup::Missing,
                Content::Complex(children) => match children.get(feature) {
                    Some(child) => current = self.resolve(*child),
                    None => return Lookup::Missing,
                },
            }
        }
        Lookup::Found(current)
    }

    /// Read-only child access; fails when `node` is atomic.
    pub fn get(&self, node: NodeId, feature: Feature) -> Result<Option<NodeId>, PatrError> {
        self.lookup(node, &[feature]).into_result()
    }

    /// Read-only path access; fails when the path runs through an atomic value.
    pub fn get_path(&self, node: NodeId, path: &FeaturePath) -> Result<Option<NodeId>, PatrError> {
        self.lookup(node, path.features()).into_result()
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    /// Add `feature → child` to `node`, turning an empty node complex.
    ///
    /// `node` must be dechained and not atomic.
    fn attach(&mut self, node: NodeId, feature: Feature, child: NodeId) {
        let slot = &mut self.slots[node.index()];
        match &mut slot.content {
            Content::Complex(children) => {
                children.insert(feature, child);
            }
            other => *other = Content::Complex(BTreeMap::from([(feature, child)])),
        }
    }

    /// The child under `feature`, creating an empty one if absent.
    fn child_or_create(&mut self, node: NodeId, feature: Feature) -> Result<NodeId, PatrError> {
        let node = self.dechain(node);
        match self.shape(node) {
            Shape::Atomic(_) => Err(PatrError::AtomicNode),
            Shape::Complex | Shape::Empty => {
                if let Some(existing) = self.child(node, feature) {
                    return Ok(existing);
                }
                let child = self.alloc(Content::Empty);
                self.attach(node, feature, child);
                Ok(child)
            }
        }
    }

    /// Walk `path` from `node`, creating empty intermediate nodes as needed,
    /// and return the dechained node at its end.
    pub fn materialize(&mut self, node: NodeId, path: &[Feature]) -> Result<NodeId, PatrError> {
        let mut current = node;
        for feature in path {
            current = self.child_or_create(current, *feature)?;
        }
        Ok(self.dechain(current))
    }

    /// Create a new leaf at `path` below `node`.
    ///
    /// The null atom creates an empty leaf. Fails on an empty path, on a path
    /// running through an atomic value, and when the path already has a value.
    pub fn create_value(
        &mut self,
        node: NodeId,
        path: &FeaturePath,
        atom: AtomicValue,
    ) -> Result<NodeId, PatrError> {
        let leaf = self.alloc(Content::leaf(atom));
        self.link_path(node, path, leaf)?;
        Ok(leaf)
    }

    /// Make the node at `path` (which must not exist yet) be `target`.
    pub fn link_path(
        &mut self,
        node: NodeId,
        path: &FeaturePath,
        target: NodeId,
    ) -> Result<(), PatrError> {
        let (last, prefix) = path.split_last().ok_or(PatrError::EmptyPath)?;
        let parent = self.materialize(node, prefix)?;
        if let Shape::Atomic(_) = self.shape(parent) {
            return Err(PatrError::AtomicNode);
        }
        if self.child(parent, last).is_some() {
            return Err(PatrError::ValueExists(path.clone()));
        }
        self.attach(parent, last, target);
        Ok(())
    }

    /// Give an empty node an atomic value.
    pub fn assign_atom(&mut self, node: NodeId, atom: AtomicValue) -> Result<(), PatrError> {
        let node = self.dechain(node);
        match self.shape(node) {
            Shape::Empty => {
                self.slots[node.index()].content = Content::leaf(atom);
                Ok(())
            }
            Shape::Atomic(_) => Err(PatrError::ValueExists(FeaturePath::new())),
            Shape::Complex => Err(PatrError::AtomicNode),
        }
    }

    // -------------------------------------------------------------------------
    // Unification
    // -------------------------------------------------------------------------

    /// Destructively unify two nodes of this graph.
    ///
    /// On success both ids resolve to the same node holding the merged
    /// content. On failure the graph is left partially merged: callers must
    /// discard it (or the nodes involved) rather than keep using it.
    pub fn unify(&mut self, lhs: NodeId, rhs: NodeId) -> bool {
        let lhs = self.dechain(lhs);
        let rhs = self.dechain(rhs);
        if lhs == rhs {
            return true;
        }
        match (self.shape(lhs), self.shape(rhs)) {
            (Shape::Empty, _) => {
                self.redirect(lhs, rhs);
                true
            }
            (_, Shape::Empty) => {
                self.redirect(rhs, lhs);
                true
            }
            (Shape::Atomic(a), Shape::Atomic(b)) => {
                if a != b {
                    return false;
                }
                self.redirect(lhs, rhs);
                true
            }
            (Shape::Atomic(_), Shape::Complex) | (Shape::Complex, Shape::Atomic(_)) => false,
            (Shape::Complex, Shape::Complex) => self.unify_complex(lhs, rhs),
        }
    }

    fn unify_complex(&mut self, lhs: NodeId, rhs: NodeId) -> bool {
        let pairs: Vec<(Feature, NodeId)> = match self.content(lhs) {
            Content::Complex(children) => children.iter().map(|(f, c)| (*f, *c)).collect(),
            Content::Empty | Content::Atomic(_) => Vec::new(),
        };

        for (feature, lhs_child) in pairs {
            let rhs = self.dechain(rhs);
            match self.child(rhs, feature) {
                Some(rhs_child) => {
                    if !self.unify(lhs_child, rhs_child) {
                        return false;
                    }
                }
                None => self.attach(rhs, feature, lhs_child),
            }
        }

        let lhs = self.dechain(lhs);
        let rhs = self.dechain(rhs);
        if lhs != rhs {
            self.redirect(lhs, rhs);
        }
        true
    }

    /// Non-destructive feasibility test against a node of (possibly) another graph.
    ///
    /// Never returns `false` when [`unify`](Self::unify) on copies would
    /// succeed. May return `true` when independent cross-references are
    /// pairwise compatible but not jointly.
    #[must_use]
    pub fn possibly_unifiable(&self, lhs: NodeId, other: &FsGraph, rhs: NodeId) -> bool {
        let lhs = self.resolve(lhs);
        let rhs = other.resolve(rhs);
        if std::ptr::eq(self, other) && lhs == rhs {
            return true;
        }
        match (self.content(lhs), other.content(rhs)) {
            (Content::Empty, _) | (_, Content::Empty) => true,
            (Content::Atomic(a), Content::Atomic(b)) => a == b,
            (Content::Complex(left), Content::Complex(right)) => {
                left.iter().all(|(feature, lhs_child)| {
                    right.get(feature).is_none_or(|rhs_child| {
                        self.possibly_unifiable(*lhs_child, other, *rhs_child)
                    })
                })
            }
            (Content::Atomic(_), Content::Complex(_)) | (Content::Complex(_), Content::Atomic(_)) => {
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cloning
    // -------------------------------------------------------------------------

    /// Deep-copy the structure under `node` of `source` into this graph.
    ///
    /// Nodes already present in `map` are reused, so every source node is
    /// copied at most once and reentrancy is reproduced in the copy.
    pub fn import(&mut self, source: &FsGraph, node: NodeId, map: &mut CloneMap) -> NodeId {
        let node = source.resolve(node);
        if let Some(copy) = map.get(&node) {
            return *copy;
        }
        let content = match source.content(node) {
            Content::Empty => Content::Empty,
            Content::Atomic(atom) => Content::Atomic(*atom),
            Content::Complex(children) => {
                let mut copied = BTreeMap::new();
                for (feature, child) in children {
                    copied.insert(*feature, self.import(source, *child, map));
                }
                Content::Complex(copied)
            }
        };
        let copy = self.alloc(content);
        map.insert(node, copy);
        copy
    }

    /// Like [`import`](Self::import), but a child is copied only when its
    /// feature is present in `tree`. A complex node left without features
    /// becomes an empty node.
    pub fn import_selective(
        &mut self,
        source: &FsGraph,
        node: NodeId,
        tree: &FeatureTree,
        map: &mut CloneMap,
    ) -> NodeId {
        let node = source.resolve(node);
        if let Some(copy) = map.get(&node) {
            return *copy;
        }
        let content = match source.content(node) {
            Content::Empty => Content::Empty,
            Content::Atomic(atom) => Content::Atomic(*atom),
            Content::Complex(children) => {
                let mut copied = BTreeMap::new();
                for (feature, child) in children {
                    if let Some(subtree) = tree.child(*feature) {
                        copied.insert(
                            *feature,
                            self.import_selective(source, *child, subtree, map),
                        );
                    }
                }
                if copied.is_empty() {
                    Content::Empty
                } else {
                    Content::Complex(copied)
                }
            }
        };
        let copy = self.alloc(content);
        map.insert(node, copy);
        copy
    }
}

// =============================================================================
// TESTS
// =============================================================================
