//! # patr CLI Module
//!
//! This module implements the CLI interface for patr.
//!
//! ## Available Commands
//!
//! - `eval` - List every interpretation satisfying a problem
//! - `check` - Report whether a problem is satisfiable

mod commands;

use crate::config::PatrConfig;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// patr - feature structure constraint evaluation
///
/// Assigns one candidate structure to each slot of a problem and keeps the
/// assignments that satisfy every constraint.
#[derive(Parser, Debug)]
#[command(name = "patr")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "patr.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a problem and list its interpretations
    Eval {
        /// Path to the problem document (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Skip the candidate pre-filter
        #[arg(long)]
        no_quick_check: bool,

        /// Add a wildcard column for constrained slots without candidates
        #[arg(long)]
        wildcards: bool,
    },

    /// Check whether a problem has any interpretation
    Check {
        /// Path to the problem document (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Load the configuration file named by `--config`.
pub fn load_config(path: &Path) -> Result<PatrConfig, AppError> {
    Ok(PatrConfig::load(path)?)
}

/// Execute the CLI with parsed arguments.
///
/// Returns `Ok(false)` when `check` finds the problem unsatisfiable.
pub fn execute(cli: Cli, config: &PatrConfig) -> Result<bool, AppError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Eval {
            file,
            no_quick_check,
            wildcards,
        } => {
            let mut evaluation = config.evaluation;
            evaluation.quick_check &= !no_quick_check;
            evaluation.add_wildcards |= wildcards;
            cmd_eval(&file, &evaluation, json_mode)
        }
        Commands::Check { file } => cmd_check(&file, &config.evaluation, json_mode),
    }
}
