//! # patr-core
//!
//! The feature structure unification engine for patr.
//!
//! This crate represents attribute-value structures as rooted, reentrant
//! DAGs, unifies them, and searches tables of per-slot candidates for the
//! assignments that satisfy a set of declarative constraints.
//!
//! ## Layers
//!
//! - `types`, `primitives`: interned ids, paths, errors, constants
//! - `structure`: the DAG arena, [`FeatureStructure`] and [`FeatureTree`]
//! - `constraint`: absolute, relative and variable constraints
//! - `options`, `interpretation`, `evaluator`: the constraint search
//!
//! ## Architectural Constraints
//!
//! The engine:
//! - Has NO async, NO I/O and NO global state (pure Rust)
//! - Never interns symbols; callers hand it integer ids
//! - Reports malformed input as [`PatrError`] and never panics on it
//! - Iterates deterministically (ordered maps only)

// =============================================================================
// MODULES
// =============================================================================

pub mod constraint;
pub mod evaluator;
pub mod interpretation;
pub mod options;
pub mod primitives;
pub mod structure;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{AtomicValue, Feature, FeaturePath, PatrError, SlotIndex};

// =============================================================================
// RE-EXPORTS: Structures
// =============================================================================

pub use structure::{
    CloneMap, FeatureStructure, FeatureStructureSpec, FeatureTree, FsGraph, FsRef, Lookup, NodeId,
};

// =============================================================================
// RE-EXPORTS: Constraint Search
// =============================================================================

pub use constraint::{
    AbsConstraint, Constraint, ConstraintRef, ConstraintSet, PathTerm, RelConstraint,
    VarConstraint,
};
pub use evaluator::{ConstraintEvaluator, EvaluatorConfig};
pub use interpretation::{Interpretation, PotentialInterpretation};
pub use options::{OptionColumn, OptionTable};
pub use primitives::{CERTAIN, IMPOSSIBLE, ROOT_INDEX};
