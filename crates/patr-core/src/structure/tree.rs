//! # Feature Trees
//!
//! A prefix tree over feature paths. Selective cloning keeps exactly the
//! branches named here.

use crate::types::{Feature, FeaturePath};
use std::collections::BTreeMap;

/// Prefix tree of features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTree {
    children: BTreeMap<Feature, FeatureTree>,
}

impl FeatureTree {
    /// Create a tree containing only the empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` and all of its prefixes.
    pub fn insert(&mut self, path: &FeaturePath) {
        let mut node = self;
        for feature in path {
            node = node.children.entry(*feature).or_default();
        }
    }

    /// The subtree below `feature`.
    #[must_use]
    pub fn child(&self, feature: Feature) -> Option<&FeatureTree> {
        self.children.get(&feature)
    }

    /// Whether `path` was inserted (or is a prefix of an inserted path).
    #[must_use]
    pub fn contains(&self, path: &FeaturePath) -> bool {
        let mut node = self;
        for feature in path {
            match node.child(*feature) {
                Some(next) => node = next,
                None => return false,
            }
        }
        true
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The maximal paths of the tree, in order.
    #[must_use]
    pub fn leaves(&self) -> Vec<FeaturePath> {
        let mut out = Vec::new();
        self.collect(FeaturePath::new(), &mut out);
        out
    }

    fn collect(&self, prefix: FeaturePath, out: &mut Vec<FeaturePath>) {
        if self.is_leaf() {
            out.push(prefix);
            return;
        }
        for (feature, subtree) in &self.children {
            subtree.collect(prefix.child(*feature), out);
        }
    }
}

impl FromIterator<FeaturePath> for FeatureTree {
    fn from_iter<I: IntoIterator<Item = FeaturePath>>(iter: I) -> Self {
        let mut tree = Self::new();
        for path in iter {
            tree.insert(&path);
        }
        tree
    }
}
