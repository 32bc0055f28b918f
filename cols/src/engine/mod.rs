//! Reshaping engine.
//!
//! This module handles one table at a time:
//! - `column`: `@N` / `@"Name"` references and their resolution
//! - `table`: header plus rows, with the column mutations operations need
//! - `window`: skip/head/tail/trunc/max row bounds
//! - `executor`: runs script steps in order
//! - `projector`: selection state and the final output projection
//! - `pipeline`: per-file loop and output writing

pub mod column;
pub mod executor;
pub mod pipeline;
pub mod projector;
pub mod table;
pub mod window;

pub use column::{resolve, ColumnRef};
pub use executor::{execute, ExecutionReport, SkippedStep};
pub use pipeline::{process_table, run, RunSummary};
pub use projector::{ProjectedTable, Projection, Selection, Touch};
pub use table::{Row, Table};
pub use window::RowWindow;
