//! # Structure Descriptions
//!
//! A flat, write-once description from which a [`FeatureStructure`] is built.
//! Parsers and lexicon loaders produce these; the engine only consumes them.
//!
//! [`FeatureStructure`]: super::FeatureStructure

use crate::types::{AtomicValue, FeaturePath};

/// Path → atom content pairs plus path ↔ path equivalences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureStructureSpec {
    values: Vec<(FeaturePath, AtomicValue)>,
    equivalences: Vec<(FeaturePath, FeaturePath)>,
}

impl FeatureStructureSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_value`](Self::add_value).
    #[must_use]
    pub fn with_value(mut self, path: FeaturePath, atom: AtomicValue) -> Self {
        self.add_value(path, atom);
        self
    }

    /// Builder form of [`add_equivalence`](Self::add_equivalence).
    #[must_use]
    pub fn with_equivalence(mut self, lhs: FeaturePath, rhs: FeaturePath) -> Self {
        self.add_equivalence(lhs, rhs);
        self
    }

    /// Record that `path` holds `atom`. The null atom records an empty value.
    pub fn add_value(&mut self, path: FeaturePath, atom: AtomicValue) {
        self.values.push((path, atom));
    }

    /// Record that `lhs` and `rhs` address one shared node.
    pub fn add_equivalence(&mut self, lhs: FeaturePath, rhs: FeaturePath) {
        self.equivalences.push((lhs, rhs));
    }

    #[must_use]
    pub fn values(&self) -> &[(FeaturePath, AtomicValue)] {
        &self.values
    }

    #[must_use]
    pub fn equivalences(&self) -> &[(FeaturePath, FeaturePath)] {
        &self.equivalences
    }

    /// Whether the description is empty (describes the empty structure).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.equivalences.is_empty()
    }
}
