//! Per-file run loop: read → window → execute → project → write.
//!
//! # Example
//!
//! ```rust,ignore
//! use cols::{run, RunOptions, Script, TracingSink};
//!
//! let script = Script::load("reshape.conf")?;
//! let summary = run(&script, &inputs, &RunOptions::default(), std::io::stdout(), &TracingSink)?;
//! eprintln!("{} rows written", summary.rows_written);
//! ```

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{HeaderPolicy, RunOptions};
use crate::engine::executor::execute;
use crate::engine::projector::ProjectedTable;
use crate::engine::table::Table;
use crate::error::{RunError, RunResult};
use crate::logs::LogSink;
use crate::parser::read_table;
use crate::script::Script;

/// Totals for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Inputs read
    pub files: usize,
    /// Inputs that produced output
    pub files_written: usize,
    /// Data rows written, headers excluded
    pub rows_written: usize,
    /// Operation lines skipped, summed over inputs
    pub skipped_steps: usize,
}

/// Reshape one table with a script.
///
/// Returns the projected table, `None` when the final projection selects
/// nothing, along with the number of skipped operation lines.
pub fn process_table(
    mut table: Table,
    script: &Script,
    options: &RunOptions,
    log: &dyn LogSink,
) -> (Option<ProjectedTable>, usize) {
    let before = table.row_count();
    table.retain_rows(|rows| script.window.apply(rows));
    if !script.window.is_unbounded() {
        log.debug(format!("Row window kept {} of {} rows", table.row_count(), before));
    }

    let report = execute(&mut table, &script.steps, log);
    log.info(report.summary());

    let projection = report
        .selection
        .project(table.width(), options.default_projection);
    (projection.apply(&table, log), report.skipped.len())
}

/// Run a script over every input in order, writing to `out`.
///
/// Any input that cannot be read stops the run.
pub fn run<W: Write>(
    script: &Script,
    inputs: &[PathBuf],
    options: &RunOptions,
    out: W,
    log: &dyn LogSink,
) -> RunResult<RunSummary> {
    let mut writer = RowWriter::new(out, options);

    for key in script.directives.unknown_keys() {
        log.warning(format!("Ignoring unknown directive 'in {}'", key));
    }

    let mut summary = RunSummary::default();
    let mut header_written = false;

    for path in inputs {
        let table = load_input(path, script, log)?;
        summary.files += 1;

        let (projected, skipped) = process_table(table, script, options, log);
        summary.skipped_steps += skipped;
        let Some(projected) = projected else {
            continue;
        };

        let write_header = match options.header_policy {
            HeaderPolicy::Once => !header_written,
            HeaderPolicy::PerFile => true,
        };
        if write_header {
            writer.write_row(&projected.header)?;
            header_written = true;
        }
        for row in &projected.rows {
            writer.write_row(row)?;
        }

        summary.files_written += 1;
        summary.rows_written += projected.rows.len();
        log.info(format!(
            "{}: wrote {} rows",
            path.display(),
            projected.rows.len()
        ));
    }

    writer.flush()?;
    Ok(summary)
}

/// Output rows, either joined raw or quoted where needed.
///
/// Rows of one run may differ in width, since each input projects its own
/// header.
enum RowWriter<W: Write> {
    Plain { out: BufWriter<W>, delimiter: u8 },
    Quoted(csv::Writer<W>),
}

impl<W: Write> RowWriter<W> {
    fn new(out: W, options: &RunOptions) -> Self {
        if options.quote {
            let writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .delimiter(options.output_delimiter)
                .quote_style(QuoteStyle::Necessary)
                .from_writer(out);
            RowWriter::Quoted(writer)
        } else {
            RowWriter::Plain {
                out: BufWriter::new(out),
                delimiter: options.output_delimiter,
            }
        }
    }

    fn write_row(&mut self, fields: &[String]) -> RunResult<()> {
        match self {
            RowWriter::Plain { out, delimiter } => {
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.write_all(&[*delimiter])?;
                    }
                    out.write_all(field.as_bytes())?;
                }
                out.write_all(b"\n")?;
            }
            RowWriter::Quoted(writer) => writer.write_record(fields)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> RunResult<()> {
        match self {
            RowWriter::Plain { out, .. } => out.flush()?,
            RowWriter::Quoted(writer) => writer.flush()?,
        }
        Ok(())
    }
}

fn load_input(path: &Path, script: &Script, log: &dyn LogSink) -> RunResult<Table> {
    log.info(format!("Reading {}", path.display()));
    let parsed = read_table(path, &script.format).map_err(|source| RunError::Input {
        path: path.display().to_string(),
        source,
    })?;

    log.debug(format!(
        "Detected encoding: {}, delimiter: '{}'",
        parsed.encoding,
        format_delimiter(parsed.delimiter)
    ));
    if parsed.ragged > 0 {
        log.warning(format!(
            "{}: {} rows did not match the header width and were padded or cut",
            path.display(),
            parsed.ragged
        ));
    }
    Ok(parsed.table)
}

fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "\\t".to_string(),
        c => (c as char).to_string(),
    }
}
