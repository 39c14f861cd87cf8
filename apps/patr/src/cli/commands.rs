//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::EvaluationConfig;
use crate::error::AppError;
use crate::problem::{Problem, ProblemDocument};
use patr_core::ConstraintEvaluator;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum problem document size (50 MB).
const MAX_PROBLEM_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), AppError> {
    let metadata = std::fs::metadata(path)?;

    if metadata.len() > max_size {
        return Err(AppError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve `path` and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, AppError> {
    let canonical = path.canonicalize()?;

    if !canonical.is_file() {
        return Err(AppError::InvalidInput(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate, read and compile a problem file.
fn load_problem(file: &Path, evaluation: &EvaluationConfig) -> Result<Problem, AppError> {
    let path = validate_file_path(file)?;
    validate_file_size(&path, MAX_PROBLEM_FILE_SIZE)?;

    let mut problem = ProblemDocument::load(&path)?.compile()?;
    if evaluation.add_wildcards {
        let added = problem.add_wildcards();
        tracing::debug!(event = "wildcards_added", columns = added);
    }
    Ok(problem)
}

// =============================================================================
// EVAL COMMAND
// =============================================================================

/// Evaluate a problem and print every surviving interpretation.
pub fn cmd_eval(
    file: &Path,
    evaluation: &EvaluationConfig,
    json_mode: bool,
) -> Result<bool, AppError> {
    let problem = load_problem(file, evaluation)?;
    let evaluator = ConstraintEvaluator::with_config(evaluation.evaluator());
    let results = problem.evaluate(&evaluator);

    tracing::info!(
        event = "evaluation_complete",
        file = %file.display(),
        interpretations = results.len(),
        quick_check = evaluation.quick_check,
    );

    let rendered = results
        .iter()
        .map(|interpretation| problem.symbols.render(interpretation))
        .collect::<Result<Vec<_>, _>>()?;

    if json_mode {
        let output = serde_json::json!({
            "file": file.to_string_lossy(),
            "satisfiable": !rendered.is_empty(),
            "count": rendered.len(),
            "max_probability": problem.constraints.max_probability(),
            "interpretations": rendered,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(true);
    }

    println!("patr Evaluation");
    println!("===============");
    println!("File:            {}", file.display());
    println!("Slots:           {}", problem.table.len());
    println!("Constraints:     {}", problem.constraints.size());
    println!("Interpretations: {}", rendered.len());

    for (n, interpretation) in rendered.iter().enumerate() {
        println!();
        println!("#{}  probability {:.6}", n + 1, interpretation.probability);
        for slot in &interpretation.slots {
            println!("  [{}]", slot.index);
            for value in &slot.values {
                println!("    {} = {}", value.path, value.atom);
            }
        }
    }

    Ok(true)
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report whether a problem is satisfiable.
pub fn cmd_check(
    file: &Path,
    evaluation: &EvaluationConfig,
    json_mode: bool,
) -> Result<bool, AppError> {
    let problem = load_problem(file, evaluation)?;
    let evaluator = ConstraintEvaluator::with_config(evaluation.evaluator());
    let satisfiable = problem.is_satisfiable(&evaluator);

    tracing::info!(event = "check_complete", file = %file.display(), satisfiable);

    if json_mode {
        let output = serde_json::json!({
            "file": file.to_string_lossy(),
            "satisfiable": satisfiable,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if satisfiable {
        println!("satisfiable");
    } else {
        println!("unsatisfiable");
    }

    Ok(satisfiable)
}
