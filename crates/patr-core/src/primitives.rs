//! # Engine Primitives
//!
//! Fixed constants shared by the constraint model and the evaluator.

use crate::types::SlotIndex;

/// The slot holding the root of a rule (its left-hand side).
///
/// Constraints mentioning this slot report `contains_root() == true`.
pub const ROOT_INDEX: SlotIndex = 0;

/// Probability of an interpretation before any weighted constraint applies.
pub const CERTAIN: f64 = 1.0;

/// Probability assigned when an atomic value falls outside a distribution.
pub const IMPOSSIBLE: f64 = 0.0;
