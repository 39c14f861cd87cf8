//! # patr
//!
//! Command-line driver over `patr-core`: reads a JSON problem document,
//! searches its candidate table and prints the surviving interpretations.
//!
//! The binary in `main.rs` only sets up logging and delegates to [`cli`].

pub mod cli;
pub mod config;
pub mod error;
pub mod problem;

pub use config::{ConfigError, LogFormat, PatrConfig};
pub use error::AppError;
pub use problem::{Problem, ProblemDocument, Symbols};
