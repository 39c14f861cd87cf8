//! # Constraint Evaluator
//!
//! Column-by-column search over an [`OptionTable`] for the slot assignments
//! satisfying a [`ConstraintSet`].
//!
//! The first column seeds one interpretation per surviving candidate. Every
//! later column crosses the current generation with its candidates; each
//! pairing is quick-checked, then copied, merged and evaluated in full. A
//! rejected pairing is never revisited, so an empty generation ends the
//! search.
//!
//! Within a generation results are ordered candidate first, previous
//! interpretation second.

use crate::constraint::ConstraintSet;
use crate::interpretation::{Interpretation, PotentialInterpretation};
use crate::options::{OptionColumn, OptionTable};
use crate::types::SlotIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Evaluator tuning. None of these settings change the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Run [`PotentialInterpretation::quick_check`] before the full merge.
    pub quick_check: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { quick_check: true }
    }
}

/// Drives the incremental search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintEvaluator {
    config: EvaluatorConfig,
}

impl ConstraintEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Find every assignment of one candidate per column that satisfies
    /// `constraints`, replacing the contents of `results`.
    ///
    /// Every slot named by a constraint must have a column. Returns whether
    /// at least one interpretation survived.
    pub fn eval(
        &self,
        table: &OptionTable,
        constraints: &ConstraintSet,
        results: &mut Vec<Interpretation>,
    ) -> bool {
        results.clear();
        debug!(
            event = "eval_start",
            columns = table.len(),
            constraints = constraints.size(),
            quick_check = self.config.quick_check,
        );

        if let Some(index) = uncovered_index(constraints, |index| table.contains_index(index)) {
            debug!(event = "eval_end", missing_column = index, results = 0u64);
            return false;
        }

        let mut columns = table.iter();
        let Some((first_index, first_column)) = columns.next() else {
            debug!(event = "eval_end", results = 0u64);
            return false;
        };

        let seeds: Vec<Interpretation> = first_column
            .iter()
            .filter_map(|candidate| {
                let mut seed = Interpretation::new(first_index, candidate);
                seed.eval(constraints).then_some(seed)
            })
            .collect();
        debug!(
            event = "generation",
            index = first_index,
            candidates = first_column.len(),
            survivors = seeds.len(),
        );

        self.run(seeds, columns, constraints, results)
    }

    /// Extend `previous` with every column of `table`.
    ///
    /// Every slot named by a constraint must have a column or be assigned in
    /// all of `previous`.
    pub fn eval_from(
        &self,
        previous: &[Interpretation],
        table: &OptionTable,
        constraints: &ConstraintSet,
        results: &mut Vec<Interpretation>,
    ) -> bool {
        results.clear();
        debug!(
            event = "eval_start",
            previous = previous.len(),
            columns = table.len(),
            constraints = constraints.size(),
            quick_check = self.config.quick_check,
        );

        let covered = |index| {
            table.contains_index(index) || previous.iter().all(|p| p.contains_index(index))
        };
        if let Some(index) = uncovered_index(constraints, covered) {
            debug!(event = "eval_end", missing_column = index, results = 0u64);
            return false;
        }

        self.run(previous.to_vec(), table.iter(), constraints, results)
    }

    /// Whether any assignment satisfies `constraints`.
    #[must_use]
    pub fn eval_any(&self, table: &OptionTable, constraints: &ConstraintSet) -> bool {
        // TODO: stop at the first interpretation surviving the last column.
        let mut results = Vec::new();
        self.eval(table, constraints, &mut results)
    }

    fn run<'t>(
        &self,
        mut generation: Vec<Interpretation>,
        columns: impl Iterator<Item = (SlotIndex, &'t OptionColumn)>,
        constraints: &ConstraintSet,
        results: &mut Vec<Interpretation>,
    ) -> bool {
        for (index, column) in columns {
            if generation.is_empty() {
                break;
            }
            generation = self.expand(&generation, index, column, constraints);
            debug!(
                event = "generation",
                index,
                candidates = column.len(),
                survivors = generation.len(),
            );
        }

        *results = generation;
        debug!(event = "eval_end", results = results.len());
        !results.is_empty()
    }

    fn expand(
        &self,
        previous: &[Interpretation],
        index: SlotIndex,
        column: &OptionColumn,
        constraints: &ConstraintSet,
    ) -> Vec<Interpretation> {
        let mut next = Vec::new();
        for (candidate_no, candidate) in column.iter().enumerate() {
            for base in previous {
                let potential = PotentialInterpretation::new(base, index, candidate);
                if self.config.quick_check && !potential.quick_check(constraints) {
                    trace!(event = "quick_check_rejected", index, candidate = candidate_no);
                    continue;
                }
                let mut interpretation = Interpretation::from(potential);
                if interpretation.eval(constraints) {
                    next.push(interpretation);
                } else {
                    trace!(event = "eval_rejected", index, candidate = candidate_no);
                }
            }
        }
        next
    }
}

/// The first slot named by `constraints` for which `covered` fails.
fn uncovered_index(
    constraints: &ConstraintSet,
    covered: impl Fn(SlotIndex) -> bool,
) -> Option<SlotIndex> {
    constraints.indices().into_iter().find(|index| !covered(*index))
}

// =============================================================================
// TESTS
// =============================================================================
