//! # Cols - CSV column reshaping scripts
//!
//! Cols applies a small line-oriented script to one or more CSV files:
//! rename, insert, fill, move, swap and search/replace columns, narrow the
//! rows, then pick which columns are written.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Executor   │────▶│  Projector  │──▶ CSV out
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (script ops)│     │ (use/touch) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                      script ──▶ Script::parse ─┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cols::{run, RunOptions, Script, TracingSink};
//! use std::path::PathBuf;
//!
//! let script = Script::load("reshape.conf").unwrap();
//! let inputs = vec![PathBuf::from("input.csv")];
//! let summary = run(&script, &inputs, &RunOptions::default(), std::io::stdout(), &TracingSink).unwrap();
//! eprintln!("Wrote {} rows", summary.rows_written);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`config`] - Run options from defaults, environment and flags
//! - [`logs`] - Leveled log entries and sinks
//! - [`parser`] - CSV reading with encoding and delimiter detection
//! - [`script`] - Script tokenizer, directives and operations
//! - [`engine`] - Column resolution, row window, executor, projector, run loop

// Core modules
pub mod config;
pub mod error;
pub mod logs;

// Parsing
pub mod parser;
pub mod script;

// Execution
pub mod engine;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError,
    CsvResult,
    ProjectionError,
    RunError,
    RunResult,
    ScriptError,
    ScriptResult,
};

// =============================================================================
// Re-exports - Configuration & Logging
// =============================================================================

pub use config::{DefaultProjection, HeaderPolicy, RunOptions};
pub use logs::{LogEntry, LogLevel, LogSink, MemorySink, TracingSink};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes,
    parse_table,
    read_table,
    ParseResult,
};

// =============================================================================
// Re-exports - Script
// =============================================================================

pub use script::{
    operations_description,
    sample_script,
    Operation,
    Script,
    Step,
    UseTarget,
};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use engine::{
    execute,
    process_table,
    run,
    ColumnRef,
    ExecutionReport,
    ProjectedTable,
    RowWindow,
    RunSummary,
    Selection,
    Table,
};
