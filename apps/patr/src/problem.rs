//! # Problem Documents
//!
//! The JSON format the driver reads, and its translation into the engine's
//! integer world.
//!
//! ```json
//! {
//!   "slots": [
//!     { "index": 1, "options": [
//!       { "values": [ { "path": ["AGR", "CASE"], "atom": "NOM" } ] }
//!     ] }
//!   ],
//!   "constraints": [
//!     { "type": "rel",
//!       "lhs": { "index": 1, "path": ["AGR"] },
//!       "rhs": { "index": 2, "path": ["AGR"] } },
//!     { "type": "var",
//!       "term": { "index": 1, "path": ["AGR", "CASE"] },
//!       "distribution": { "NOM": 0.7, "ACC": 0.3 } }
//!   ]
//! }
//! ```
//!
//! Feature and atom names are interned by [`Symbols`] in the order they are
//! first seen. A value without an `atom` is an empty placeholder.

use crate::error::AppError;
use patr_core::{
    AbsConstraint, AtomicValue, ConstraintEvaluator, ConstraintSet, Feature, FeaturePath,
    FeatureStructure, FeatureStructureSpec, Interpretation, OptionTable, PathTerm,
    RelConstraint, SlotIndex, VarConstraint,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// DOCUMENT SCHEMA
// =============================================================================

/// A whole problem: candidate columns plus the constraints over them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProblemDocument {
    #[serde(default)]
    pub slots: Vec<SlotDocument>,

    #[serde(default)]
    pub constraints: Vec<ConstraintDocument>,
}

/// The candidates for one slot. Repeated indices append to the same column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlotDocument {
    pub index: SlotIndex,

    #[serde(default)]
    pub options: Vec<StructureDocument>,
}

/// A feature structure as leaf values plus path equivalences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StructureDocument {
    #[serde(default)]
    pub values: Vec<ValueDocument>,

    #[serde(default)]
    pub equivalences: Vec<(Vec<String>, Vec<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValueDocument {
    #[serde(default)]
    pub path: Vec<String>,

    #[serde(default)]
    pub atom: Option<String>,
}

/// A path inside one slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TermDocument {
    pub index: SlotIndex,

    #[serde(default)]
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConstraintDocument {
    Abs {
        term: TermDocument,
        value: String,
    },
    Rel {
        lhs: TermDocument,
        rhs: TermDocument,
    },
    Var {
        term: TermDocument,
        distribution: BTreeMap<String, f64>,
    },
}

impl ProblemDocument {
    /// Reads and parses a problem file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parses a problem from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Interns every symbol and builds the engine inputs.
    ///
    /// Slots are interned before constraints, each in document order.
    pub fn compile(&self) -> Result<Problem, AppError> {
        let mut symbols = Symbols::new();
        let mut table = OptionTable::new();

        for slot in &self.slots {
            for option in &slot.options {
                let spec = symbols.spec(option);
                table.push(slot.index, FeatureStructure::from_spec(&spec)?);
            }
        }

        let mut constraints = ConstraintSet::new();
        for constraint in &self.constraints {
            match constraint {
                ConstraintDocument::Abs { term, value } => {
                    let term = symbols.term(term);
                    constraints.insert(AbsConstraint::new(term, symbols.atom(value)));
                }
                ConstraintDocument::Rel { lhs, rhs } => {
                    let lhs = symbols.term(lhs);
                    constraints.insert(RelConstraint::new(lhs, symbols.term(rhs)));
                }
                ConstraintDocument::Var { term, distribution } => {
                    let term = symbols.term(term);
                    let distribution = distribution
                        .iter()
                        .map(|(atom, p)| (symbols.atom(atom), *p))
                        .collect();
                    constraints.insert(VarConstraint::new(term, distribution));
                }
            }
        }

        tracing::debug!(
            event = "problem_compiled",
            slots = table.len(),
            constraints = constraints.size(),
            features = symbols.features.len(),
            atoms = symbols.atoms.len(),
        );

        Ok(Problem {
            table,
            constraints,
            symbols,
        })
    }
}

// =============================================================================
// SYMBOL TABLE
// =============================================================================

/// Name ↔ id tables for features and atoms.
///
/// Features are numbered from 0, atoms from 1 (0 is the null atom).
#[derive(Debug, Clone, Default)]
pub struct Symbols {
    features: Vec<String>,
    feature_ids: BTreeMap<String, Feature>,
    atoms: Vec<String>,
    atom_ids: BTreeMap<String, AtomicValue>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of `name`, interning it if new.
    pub fn feature(&mut self, name: &str) -> Feature {
        if let Some(id) = self.feature_ids.get(name) {
            return *id;
        }
        let id = Feature(self.features.len() as u32);
        self.features.push(name.to_string());
        self.feature_ids.insert(name.to_string(), id);
        id
    }

    /// The id of `name`, interning it if new.
    pub fn atom(&mut self, name: &str) -> AtomicValue {
        if let Some(id) = self.atom_ids.get(name) {
            return *id;
        }
        let id = AtomicValue(self.atoms.len() as u32 + 1);
        self.atoms.push(name.to_string());
        self.atom_ids.insert(name.to_string(), id);
        id
    }

    pub fn path(&mut self, names: &[String]) -> FeaturePath {
        names.iter().map(|name| self.feature(name)).collect()
    }

    fn term(&mut self, term: &TermDocument) -> PathTerm {
        PathTerm::new(term.index, self.path(&term.path))
    }

    fn spec(&mut self, structure: &StructureDocument) -> FeatureStructureSpec {
        let mut spec = FeatureStructureSpec::new();
        for value in &structure.values {
            let path = self.path(&value.path);
            let atom = value
                .atom
                .as_deref()
                .map_or(AtomicValue::NULL, |name| self.atom(name));
            spec.add_value(path, atom);
        }
        for (lhs, rhs) in &structure.equivalences {
            let lhs = self.path(lhs);
            spec.add_equivalence(lhs, self.path(rhs));
        }
        spec
    }

    /// Looks up an interned feature without interning.
    pub fn feature_id(&self, name: &str) -> Option<Feature> {
        self.feature_ids.get(name).copied()
    }

    /// Looks up an interned atom without interning.
    pub fn atom_id(&self, name: &str) -> Option<AtomicValue> {
        self.atom_ids.get(name).copied()
    }

    pub fn feature_name(&self, feature: Feature) -> Result<&str, AppError> {
        self.features
            .get(feature.id() as usize)
            .map(String::as_str)
            .ok_or_else(|| AppError::UnknownSymbol(format!("feature {}", feature)))
    }

    /// The name of `atom`; the null atom renders as `_`.
    pub fn atom_name(&self, atom: AtomicValue) -> Result<&str, AppError> {
        if atom.is_null() {
            return Ok("_");
        }
        self.atoms
            .get(atom.id() as usize - 1)
            .map(String::as_str)
            .ok_or_else(|| AppError::UnknownSymbol(format!("atom {}", atom)))
    }

    /// `<F G H>` with feature names.
    pub fn render_path(&self, path: &FeaturePath) -> Result<String, AppError> {
        let names = path
            .iter()
            .map(|feature| self.feature_name(*feature))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("<{}>", names.join(" ")))
    }

    /// Names every leaf of every slot in `interpretation`.
    pub fn render(&self, interpretation: &Interpretation) -> Result<RenderedInterpretation, AppError> {
        let mut slots = Vec::with_capacity(interpretation.len());
        for (index, value) in interpretation.iter() {
            let values = value
                .leaf_paths()
                .iter()
                .map(|(path, atom)| {
                    Ok(RenderedValue {
                        path: self.render_path(path)?,
                        atom: self.atom_name(*atom)?.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            slots.push(RenderedSlot { index, values });
        }
        Ok(RenderedInterpretation {
            probability: interpretation.probability(),
            slots,
        })
    }
}

// =============================================================================
// COMPILED PROBLEM
// =============================================================================

/// Engine inputs plus the symbols needed to print results.
#[derive(Debug, Clone)]
pub struct Problem {
    pub table: OptionTable,
    pub constraints: ConstraintSet,
    pub symbols: Symbols,
}

impl Problem {
    /// Adds a wildcard column for every constrained slot without candidates.
    pub fn add_wildcards(&mut self) -> usize {
        self.table.add_wildcards(&self.constraints)
    }

    /// All surviving interpretations.
    pub fn evaluate(&self, evaluator: &ConstraintEvaluator) -> Vec<Interpretation> {
        let mut results = Vec::new();
        evaluator.eval(&self.table, &self.constraints, &mut results);
        results
    }

    /// Whether any interpretation survives.
    pub fn is_satisfiable(&self, evaluator: &ConstraintEvaluator) -> bool {
        evaluator.eval_any(&self.table, &self.constraints)
    }
}

// =============================================================================
// RENDERED OUTPUT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedInterpretation {
    pub probability: f64,
    pub slots: Vec<RenderedSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSlot {
    pub index: SlotIndex,
    pub values: Vec<RenderedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedValue {
    pub path: String,
    pub atom: String,
}
