//! Error types for the cols pipeline.
//!
//! One enum per layer:
//!
//! - [`ScriptError`] - script loading and directive validation
//! - [`CsvError`] - reading and decoding an input table
//! - [`ProjectionError`] - building one output row
//! - [`RunError`] - top-level orchestration
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! layer boundaries.

use thiserror::Error;

// =============================================================================
// Script Errors
// =============================================================================

/// Errors while loading a script.
///
/// Only conditions that make the whole run unsafe end up here. Problems with a
/// single operation line (unknown command, unresolvable column) are warnings.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Failed to read the script file.
    #[error("Failed to read script: {0}")]
    IoError(#[from] std::io::Error),

    /// A directive value that cannot be used.
    #[error("Invalid value for 'in {key}' on line {line}: {message}")]
    InvalidDirective {
        key: String,
        line: usize,
        message: String,
    },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading an input table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV record.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// No header line.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Projection Errors
// =============================================================================

/// A projected position does not exist in a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column {position} is out of range for a row of {width} fields")]
pub struct ProjectionError {
    pub position: usize,
    pub width: usize,
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::engine::pipeline::run`].
#[derive(Debug, Error)]
pub enum RunError {
    /// Script could not be loaded.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// An input could not be read.
    #[error("Input '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: CsvError,
    },

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] csv::Error),

    /// IO error outside of input reading.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid run configuration.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for script loading.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for a run.
pub type RunResult<T> = Result<T, RunError>;
