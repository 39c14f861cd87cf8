//! # Application Errors
//!
//! Everything the driver can fail on, from file access to unknown symbols.
//! Engine precondition violations are carried through unchanged.

use crate::config::ConfigError;
use patr_core::PatrError;
use thiserror::Error;

/// Errors raised by the patr driver.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading an input file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file exists but may not be read.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A problem document is not valid JSON for its schema.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An interned id has no name in the symbol table.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The engine rejected a structure description.
    #[error(transparent)]
    Core(#[from] PatrError),
}
