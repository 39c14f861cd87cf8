//! # Option Tables
//!
//! Candidate structures per slot, supplied by whoever looked the slots up.
//! The evaluator only reads them.

use crate::constraint::ConstraintSet;
use crate::structure::FeatureStructure;
use crate::types::SlotIndex;
use std::collections::BTreeMap;

/// Ordered candidates for one slot.
#[derive(Debug, Clone, Default)]
pub struct OptionColumn(Vec<FeatureStructure>);

impl OptionColumn {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A column holding a single empty structure, which unifies with anything.
    #[must_use]
    pub fn wildcard() -> Self {
        Self(vec![FeatureStructure::new()])
    }

    pub fn push(&mut self, candidate: FeatureStructure) {
        self.0.push(candidate);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureStructure> {
        self.0.iter()
    }
}

impl FromIterator<FeatureStructure> for OptionColumn {
    fn from_iter<I: IntoIterator<Item = FeatureStructure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OptionColumn {
    type Item = &'a FeatureStructure;
    type IntoIter = std::slice::Iter<'a, FeatureStructure>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Slot index → candidate column, iterated in ascending index order.
#[derive(Debug, Clone, Default)]
pub struct OptionTable(BTreeMap<SlotIndex, OptionColumn>);

impl OptionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column for `index`, returning the one it replaces.
    pub fn insert(&mut self, index: SlotIndex, column: OptionColumn) -> Option<OptionColumn> {
        self.0.insert(index, column)
    }

    /// Append a candidate to the column for `index`, creating it if needed.
    pub fn push(&mut self, index: SlotIndex, candidate: FeatureStructure) {
        self.0.entry(index).or_default().push(candidate);
    }

    #[must_use]
    pub fn column(&self, index: SlotIndex) -> Option<&OptionColumn> {
        self.0.get(&index)
    }

    #[must_use]
    pub fn contains_index(&self, index: SlotIndex) -> bool {
        self.0.contains_key(&index)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &OptionColumn)> {
        self.0.iter().map(|(index, column)| (*index, column))
    }

    /// Give every index named by `constraints` but lacking a column a
    /// [wildcard](OptionColumn::wildcard) column. Returns how many were added.
    pub fn add_wildcards(&mut self, constraints: &ConstraintSet) -> usize {
        let mut added = 0;
        for index in constraints.indices() {
            if !self.contains_index(index) {
                self.0.insert(index, OptionColumn::wildcard());
                added += 1;
            }
        }
        added
    }
}

impl FromIterator<(SlotIndex, OptionColumn)> for OptionTable {
    fn from_iter<I: IntoIterator<Item = (SlotIndex, OptionColumn)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
