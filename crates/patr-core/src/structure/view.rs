//! # Read-Only Views
//!
//! [`FsRef`] pairs a graph with one of its nodes. It is how standalone
//! structures and the slots of an interpretation are inspected.

use super::graph::{Content, FsGraph, Lookup, NodeId};
use crate::types::{AtomicValue, Feature, FeaturePath, PatrError};

/// Borrowed view of one node; every query dereferences forwarding first.
#[derive(Debug, Clone, Copy)]
pub struct FsRef<'a> {
    graph: &'a FsGraph,
    node: NodeId,
}

impl<'a> FsRef<'a> {
    pub(crate) fn new(graph: &'a FsGraph, node: NodeId) -> Self {
        Self {
            graph,
            node: graph.resolve(node),
        }
    }

    /// The graph this view reads from.
    #[must_use]
    pub fn graph(self) -> &'a FsGraph {
        self.graph
    }

    /// The authoritative node id.
    #[must_use]
    pub fn node(self) -> NodeId {
        self.node
    }

    fn content(self) -> &'a Content {
        self.graph.content(self.node)
    }

    #[must_use]
    pub fn is_atomic(self) -> bool {
        matches!(self.content(), Content::Atomic(_))
    }

    #[must_use]
    pub fn is_complex(self) -> bool {
        matches!(self.content(), Content::Complex(_))
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self.content(), Content::Empty)
    }

    /// Empty, or complex with only effectively empty children.
    #[must_use]
    pub fn is_effectively_empty(self) -> bool {
        match self.content() {
            Content::Empty => true,
            Content::Atomic(_) => false,
            Content::Complex(_) => self.features().all(|(_, child)| child.is_effectively_empty()),
        }
    }

    /// Whether this node or any node below it is empty.
    #[must_use]
    pub fn contains_empty_value(self) -> bool {
        match self.content() {
            Content::Empty => true,
            Content::Atomic(_) => false,
            Content::Complex(_) => self.features().any(|(_, child)| child.contains_empty_value()),
        }
    }

    /// The atomic value, or [`AtomicValue::NULL`] when the node is not atomic.
    #[must_use]
    pub fn atomic_value(self) -> AtomicValue {
        match self.content() {
            Content::Atomic(atom) => *atom,
            Content::Empty | Content::Complex(_) => AtomicValue::NULL,
        }
    }

    /// Child under `feature`. Fails on an atomic node.
    pub fn get(self, feature: Feature) -> Result<Option<FsRef<'a>>, PatrError> {
        Ok(self
            .graph
            .get(self.node, feature)?
            .map(|child| Self::new(self.graph, child)))
    }

    /// Node at `path`. Fails when the path runs through an atomic value.
    pub fn get_path(self, path: &FeaturePath) -> Result<Option<FsRef<'a>>, PatrError> {
        self.lookup(path).into_result()
    }

    /// Follow `path` without treating a blocked path as an error.
    #[must_use]
    pub fn lookup(self, path: &FeaturePath) -> Lookup<FsRef<'a>> {
        let graph = self.graph;
        graph
            .lookup(self.node, path.features())
            .map(|node| Self::new(graph, node))
    }

    /// The (feature, child) pairs of a complex node, in feature order.
    pub fn features(self) -> impl Iterator<Item = (Feature, FsRef<'a>)> + 'a {
        let graph = self.graph;
        let children = match self.content() {
            Content::Complex(children) => Some(children),
            Content::Empty | Content::Atomic(_) => None,
        };
        children
            .into_iter()
            .flat_map(move |map| map.iter().map(move |(f, c)| (*f, Self::new(graph, *c))))
    }

    /// Whether both views denote the same node of the same graph.
    #[must_use]
    pub fn same_node(self, other: FsRef<'_>) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.node == other.node
    }

    /// See [`FsGraph::possibly_unifiable`].
    #[must_use]
    pub fn possibly_unifiable(self, other: FsRef<'_>) -> bool {
        self.graph
            .possibly_unifiable(self.node, other.graph, other.node)
    }

    /// Every leaf path below this node with its atomic value (null for empty
    /// leaves), in path order. Shared nodes are reported under each path.
    #[must_use]
    pub fn leaf_paths(self) -> Vec<(FeaturePath, AtomicValue)> {
        let mut out = Vec::new();
        self.collect_leaves(FeaturePath::new(), &mut out);
        out
    }

    fn collect_leaves(self, prefix: FeaturePath, out: &mut Vec<(FeaturePath, AtomicValue)>) {
        if self.is_complex() {
            for (feature, child) in self.features() {
                child.collect_leaves(prefix.child(feature), out);
            }
        } else {
            out.push((prefix, self.atomic_value()));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
