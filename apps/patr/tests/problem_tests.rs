//! # Problem Document Tests
//!
//! Parsing, compilation and end-to-end evaluation through the library
//! surface of the `patr` crate.

use patr::cli::{cmd_check, cmd_eval, load_config};
use patr::config::{EvaluationConfig, LogFormat, PatrConfig};
use patr::problem::RenderedValue;
use patr::{AppError, ProblemDocument};
use patr_core::{ConstraintEvaluator, EvaluatorConfig, FeaturePath, PatrError};
use std::io::Write;

// =============================================================================
// FIXTURES
// =============================================================================

/// "die Katze": two readings of the determiner, one of the noun, agreement
/// shared through AGR.
const AGREEMENT: &str = r#"{
  "slots": [
    { "index": 1, "options": [
      { "values": [
        { "path": ["AGR", "CASE"], "atom": "NOM" },
        { "path": ["AGR", "GEN"], "atom": "FEM" }
      ] },
      { "values": [
        { "path": ["AGR", "CASE"], "atom": "ACC" },
        { "path": ["AGR", "GEN"], "atom": "FEM" }
      ] }
    ] },
    { "index": 2, "options": [
      { "values": [
        { "path": ["AGR", "GEN"], "atom": "FEM" },
        { "path": ["AGR", "NUM"], "atom": "SG" }
      ] }
    ] }
  ],
  "constraints": [
    { "type": "rel",
      "lhs": { "index": 1, "path": ["AGR"] },
      "rhs": { "index": 2, "path": ["AGR"] } },
    { "type": "var",
      "term": { "index": 1, "path": ["AGR", "CASE"] },
      "distribution": { "NOM": 0.7, "ACC": 0.3 } }
  ]
}"#;

fn agreement_with(extra: &str) -> String {
    AGREEMENT.replacen(
        r#""constraints": ["#,
        &format!(r#""constraints": [ {extra},"#),
        1,
    )
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

fn value(path: &str, atom: &str) -> RenderedValue {
    RenderedValue {
        path: path.to_string(),
        atom: atom.to_string(),
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn parses_all_constraint_shapes() {
    let document = ProblemDocument::from_json_str(&agreement_with(
        r#"{ "type": "abs", "term": { "index": 2, "path": ["AGR", "NUM"] }, "value": "SG" }"#,
    ))
    .expect("parse");

    assert_eq!(document.slots.len(), 2);
    assert_eq!(document.constraints.len(), 3);

    let problem = document.compile().expect("compile");
    assert_eq!(problem.table.len(), 2);
    assert_eq!(problem.table.column(1).map(|c| c.len()), Some(2));
    assert_eq!(problem.constraints.abs().count(), 1);
    assert_eq!(problem.constraints.rel().count(), 1);
    assert_eq!(problem.constraints.num_var_constraints(), 1);
}

#[test]
fn interns_in_document_order() {
    let problem = ProblemDocument::from_json_str(AGREEMENT)
        .expect("parse")
        .compile()
        .expect("compile");
    let symbols = &problem.symbols;

    let ids: Vec<u32> = ["AGR", "CASE", "GEN", "NUM"]
        .iter()
        .map(|name| symbols.feature_id(name).expect("feature").id())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    let atoms: Vec<u32> = ["NOM", "FEM", "ACC", "SG"]
        .iter()
        .map(|name| symbols.atom_id(name).expect("atom").id())
        .collect();
    assert_eq!(atoms, vec![1, 2, 3, 4]);
}

#[test]
fn rejects_unknown_constraint_type() {
    let result = ProblemDocument::from_json_str(&agreement_with(
        r#"{ "type": "neg", "term": { "index": 1, "path": [] } }"#,
    ));
    assert!(matches!(result, Err(AppError::Deserialization(_))));
}

#[test]
fn equivalences_share_nodes() {
    let document = ProblemDocument::from_json_str(
        r#"{ "slots": [ { "index": 0, "options": [ {
            "values": [ { "path": ["AGR", "CASE"], "atom": "NOM" } ],
            "equivalences": [ [ ["AGR"], ["HEAD", "AGR"] ] ]
        } ] } ] }"#,
    )
    .expect("parse");
    let mut problem = document.compile().expect("compile");

    let agr: FeaturePath = problem.symbols.path(&["AGR".to_string()]);
    let head_agr = problem
        .symbols
        .path(&["HEAD".to_string(), "AGR".to_string()]);
    let column = problem.table.column(0).expect("column");
    let fs = column.iter().next().expect("candidate");
    assert!(fs.coindexed(&agr, &head_agr));
}

#[test]
fn malformed_structures_surface_engine_errors() {
    let document = ProblemDocument::from_json_str(
        r#"{ "slots": [ { "index": 0, "options": [ {
            "equivalences": [ [ ["A"], ["B"] ] ]
        } ] } ] }"#,
    )
    .expect("parse");
    let result = document.compile();
    assert!(matches!(
        result,
        Err(AppError::Core(PatrError::UnresolvedEquivalence(_, _)))
    ));
}

// =============================================================================
// EVALUATION
// =============================================================================

#[test]
fn agreement_yields_weighted_readings() {
    let problem = ProblemDocument::from_json_str(AGREEMENT)
        .expect("parse")
        .compile()
        .expect("compile");
    let results = problem.evaluate(&ConstraintEvaluator::new());
    assert_eq!(results.len(), 2);

    let rendered: Vec<_> = results
        .iter()
        .map(|r| problem.symbols.render(r).expect("render"))
        .collect();

    assert!((rendered[0].probability - 0.7).abs() < 1e-9);
    assert!((rendered[1].probability - 0.3).abs() < 1e-9);

    let first = &rendered[0];
    assert_eq!(first.slots.len(), 2);
    assert_eq!(first.slots[0].index, 1);
    assert_eq!(
        first.slots[0].values,
        vec![
            value("<AGR CASE>", "NOM"),
            value("<AGR GEN>", "FEM"),
            value("<AGR NUM>", "SG"),
        ]
    );
    assert_eq!(first.slots[1].values, first.slots[0].values);
    assert_eq!(rendered[1].slots[1].values[0], value("<AGR CASE>", "ACC"));
}

#[test]
fn absolute_clash_is_unsatisfiable() {
    let problem = ProblemDocument::from_json_str(&agreement_with(
        r#"{ "type": "abs", "term": { "index": 2, "path": ["AGR", "GEN"] }, "value": "MASC" }"#,
    ))
    .expect("parse")
    .compile()
    .expect("compile");

    let evaluator = ConstraintEvaluator::new();
    assert!(problem.evaluate(&evaluator).is_empty());
    assert!(!problem.is_satisfiable(&evaluator));
}

#[test]
fn wildcards_fill_unlisted_slots() {
    let mut problem = ProblemDocument::from_json_str(&agreement_with(
        r#"{ "type": "rel",
             "lhs": { "index": 1, "path": ["AGR"] },
             "rhs": { "index": 3, "path": ["HEAD", "AGR"] } }"#,
    ))
    .expect("parse")
    .compile()
    .expect("compile");

    let evaluator = ConstraintEvaluator::new();
    assert!(problem.evaluate(&evaluator).is_empty());

    assert_eq!(problem.add_wildcards(), 1);
    let results = problem.evaluate(&evaluator);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].indices().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn quick_check_setting_does_not_change_results() {
    let problem = ProblemDocument::from_json_str(AGREEMENT)
        .expect("parse")
        .compile()
        .expect("compile");
    let with = problem.evaluate(&ConstraintEvaluator::new());
    let without = problem.evaluate(&ConstraintEvaluator::with_config(EvaluatorConfig {
        quick_check: false,
    }));

    let render = |results: &[patr_core::Interpretation]| {
        results
            .iter()
            .map(|r| problem.symbols.render(r).expect("render"))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(&with), render(&without));
}

// =============================================================================
// COMMANDS
// =============================================================================

#[test]
fn eval_command_runs_on_a_file() {
    let file = write_temp(AGREEMENT);
    let outcome = cmd_eval(file.path(), &EvaluationConfig::default(), true).expect("eval");
    assert!(outcome);
}

#[test]
fn check_command_reports_unsatisfiable() {
    let file = write_temp(&agreement_with(
        r#"{ "type": "abs", "term": { "index": 1, "path": ["AGR", "NUM"] }, "value": "PL" }"#,
    ));
    let outcome = cmd_check(file.path(), &EvaluationConfig::default(), false).expect("check");
    assert!(!outcome);
}

#[test]
fn commands_reject_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = cmd_check(dir.path(), &EvaluationConfig::default(), false);
    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[test]
fn commands_reject_missing_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = cmd_eval(&dir.path().join("absent.json"), &EvaluationConfig::default(), false);
    assert!(matches!(result, Err(AppError::Io(_))));
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("patr.toml");
    std::fs::write(
        &path,
        "[evaluation]\nquick_check = false\nadd_wildcards = true\n\n[log]\nformat = \"json\"\n",
    )
    .expect("write");

    let config = PatrConfig::load(&path).expect("load");
    assert!(!config.evaluation.quick_check);
    assert!(config.evaluation.add_wildcards);
    assert_eq!(config.log.format, LogFormat::Json);
}

#[test]
fn missing_config_gives_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = PatrConfig::load(dir.path().join("patr.toml")).expect("load");
    assert_eq!(config, PatrConfig::default());
}

#[test]
fn invalid_config_is_an_error() {
    let file = write_temp("[evaluation]\nquick_check = \"sometimes\"\n");
    let result = PatrConfig::load(file.path());
    assert!(result.is_err());
}

#[test]
fn invalid_config_surfaces_as_app_error() {
    let file = write_temp("[log]\nformat = \"xml\"\n");
    let result = load_config(file.path());
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn load_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = load_config(&dir.path().join("patr.toml")).expect("load");
    assert_eq!(config, PatrConfig::default());
}
