//! # Core Type Definitions
//!
//! This module contains the primitive types every other module builds on:
//! - Interned identifiers (`AtomicValue`, `Feature`)
//! - Feature paths (`FeaturePath`)
//! - Slot indices (`SlotIndex`)
//! - Error types (`PatrError`)
//!
//! ## Interning
//!
//! Atoms and features are opaque integers handed out by an external
//! vocabulary. The engine never looks behind the number; it only compares.
//! The atom id `0` is reserved for [`AtomicValue::NULL`], so vocabularies
//! must start numbering atoms at `1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// INTERNED IDENTIFIERS
// =============================================================================

/// Interned atomic value: the leaf label of a feature structure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AtomicValue(pub u32);

impl AtomicValue {
    /// The reserved "no atom" value. A node carrying it has no atomic content.
    pub const NULL: Self = Self(0);

    /// Create an atomic value from a raw interned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw interned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Check whether this is the null atom.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "_")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

/// Interned feature: the label on an edge of a feature structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature(pub u32);

impl Feature {
    /// Create a feature from a raw interned id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw interned id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one element (slot) whose candidate structures are being assigned.
pub type SlotIndex = u32;

// =============================================================================
// FEATURE PATH
// =============================================================================

/// An ordered sequence of features addressing a nested value.
///
/// The empty path addresses the node itself.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FeaturePath(Vec<Feature>);

impl FeaturePath {
    /// Create the empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether this path addresses the node itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a feature in place.
    pub fn push(&mut self, feature: Feature) {
        self.0.push(feature);
    }

    /// Return a new path extended by one feature.
    #[must_use]
    pub fn child(&self, feature: Feature) -> Self {
        let mut path = self.clone();
        path.push(feature);
        path
    }

    /// The features as a slice.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    /// Iterate over the features in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.0.iter()
    }

    /// Split into the final feature and the prefix leading to it.
    #[must_use]
    pub fn split_last(&self) -> Option<(Feature, &[Feature])> {
        self.0.split_last().map(|(last, prefix)| (*last, prefix))
    }

    /// Check whether `self` is a (non-strict) prefix of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &FeaturePath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<Feature>> for FeaturePath {
    fn from(features: Vec<Feature>) -> Self {
        Self(features)
    }
}

impl From<&[Feature]> for FeaturePath {
    fn from(features: &[Feature]) -> Self {
        Self(features.to_vec())
    }
}

impl FromIterator<Feature> for FeaturePath {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeaturePath {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FeaturePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, feature) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", feature)?;
        }
        write!(f, ">")
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the engine.
///
/// Every variant is a precondition violation: malformed input or a caller
/// addressing a structure in a way it cannot support. They abort the
/// enclosing operation and are never caught inside the engine.
///
/// Unification failure and constraint failure are NOT errors; those are
/// ordinary `bool` / empty results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatrError {
    /// A feature path was empty where a child had to be addressed.
    #[error("Invalid Structure: empty path where a feature is required")]
    EmptyPath,

    /// Features were addressed below an atomic value.
    #[error("Invalid Structure: cannot address features of an atomic value")]
    AtomicNode,

    /// A value already exists at the path being created.
    #[error("Invalid Structure: value already exists at {0}")]
    ValueExists(FeaturePath),

    /// More than one value was given for the empty path.
    #[error("Invalid Structure: more than one value for the root")]
    DuplicateRootValue,

    /// Neither side of an equivalence addresses an existing node.
    #[error("Invalid Structure: unresolved equivalence {0} = {1}")]
    UnresolvedEquivalence(FeaturePath, FeaturePath),

    /// Both sides of an equivalence exist but their values clash.
    #[error("Invalid Structure: inconsistent equivalence {0} = {1}")]
    InconsistentEquivalence(FeaturePath, FeaturePath),
}

// =============================================================================
// TESTS
// =============================================================================
