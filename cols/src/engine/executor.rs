//! Operation executor
//!
//! Runs script steps in order against one table. Each step sees the header
//! as left by the previous steps; column references are resolved right
//! before use. A step that cannot run is skipped with a warning and leaves
//! the table and selection untouched.

use crate::engine::column::ColumnRef;
use crate::engine::projector::Selection;
use crate::engine::table::Table;
use crate::logs::LogSink;
use crate::script::{Operation, Step, UseTarget};

/// Result of executing a script on one table
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Output selection built by the steps
    pub selection: Selection,
    /// Steps that ran
    pub applied: usize,
    /// Steps that were skipped
    pub skipped: Vec<SkippedStep>,
}

/// A step that did not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub line: usize,
    pub command: String,
    pub reason: String,
}

impl ExecutionReport {
    /// Check if every step ran
    pub fn is_ok(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Executed: {} operations, {} skipped",
            self.applied,
            self.skipped.len()
        )
    }
}

/// Execute script steps on a table.
///
/// # Arguments
/// * `table` - Table to mutate in place
/// * `steps` - Parsed operation lines, in script order
/// * `log` - Receives a warning per skipped step and debug traces
pub fn execute(table: &mut Table, steps: &[Step], log: &dyn LogSink) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for step in steps {
        log.debug(format!("Line {}: {}", step.line, step.source));
        match apply(table, &mut report.selection, &step.operation) {
            Ok(()) => report.applied += 1,
            Err(reason) => {
                log.warning(format!(
                    "Line {}: skipping '{}': {}",
                    step.line, step.source, reason
                ));
                report.skipped.push(SkippedStep {
                    line: step.line,
                    command: step.operation.command().to_string(),
                    reason,
                });
            }
        }
    }

    report
}

/// Resolve a reference or explain why it does not resolve.
fn locate(column: &ColumnRef, table: &Table) -> Result<usize, String> {
    column.resolve(table.header()).ok_or_else(|| match column {
        ColumnRef::Position(_) => format!(
            "column {} is out of range ({} columns)",
            column,
            table.width()
        ),
        ColumnRef::Name(_) => format!("column {} not found", column),
        ColumnRef::Malformed(text) => format!("'{}' is not a column reference", text),
    })
}

/// Apply one operation. On error, nothing has been changed.
fn apply(table: &mut Table, selection: &mut Selection, op: &Operation) -> Result<(), String> {
    let command = op.command();
    match op {
        Operation::Use { target } => match target {
            UseTarget::All => selection.use_all(),
            UseTarget::Range { start, end } => {
                let start = range_bound(start, table)?;
                let end = range_bound(end, table)?;
                selection.use_range(start, end);
            }
            UseTarget::Column(column) => {
                let idx = locate(column, table)?;
                selection.use_column(idx);
            }
        },

        Operation::Rename { column, name } => {
            let idx = locate(column, table)?;
            table.rename(idx, name);
            selection.touch(idx, command);
        }

        Operation::Add { column, name } => {
            let idx = locate(column, table)?;
            table.insert_column(idx, name);
            selection.column_inserted(idx);
            selection.touch(idx, command);
        }

        Operation::Set { column, value } => {
            let idx = locate(column, table)?;
            table.fill_column(idx, value);
            selection.touch(idx, command);
        }

        Operation::ReplaceAll { find, replace } => {
            table.replace_in_header(find, replace);
            table.replace_in_cells(find, replace);
        }

        Operation::ReplaceHead { find, replace } => {
            table.replace_in_header(find, replace);
        }

        Operation::ReplaceCell { find, replace } => {
            table.replace_in_cells(find, replace);
        }

        Operation::Replace {
            column,
            find,
            replace,
        } => {
            let idx = locate(column, table)?;
            table.replace_in_column(idx, find, replace);
            selection.touch(idx, command);
        }

        Operation::Move { from, to } => {
            // both ends resolve against the header before the move
            let from = locate(from, table)?;
            let to = locate(to, table)?;
            table.move_column(from, to);
            selection.column_moved(from, to);
            selection.touch(to, command);
        }

        Operation::Swap { a, b } => {
            let a = locate(a, table)?;
            let b = locate(b, table)?;
            table.swap_columns(a, b);
            selection.columns_swapped(a, b);
            selection.touch(a, command);
            selection.touch(b, command);
        }

        Operation::Unknown { keyword } => {
            return Err(format!("unrecognized operation '{}'", keyword));
        }

        Operation::Invalid { reason, .. } => return Err(reason.clone()),
    }
    Ok(())
}

/// Range ends: positions are taken as written and clipped at projection,
/// names must resolve now.
fn range_bound(column: &ColumnRef, table: &Table) -> Result<usize, String> {
    match column {
        ColumnRef::Position(idx) => Ok(*idx),
        other => locate(other, table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultProjection;
    use crate::logs::MemorySink;
    use crate::script::Script;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn people() -> Table {
        Table::new(
            strings(&["id", "name", "amount"]),
            vec![strings(&["1", "Alice", "10"]), strings(&["2", "Bob", "20"])],
        )
    }

    fn run(table: &mut Table, script: &str) -> (ExecutionReport, MemorySink) {
        let sink = MemorySink::new();
        let script = Script::parse(script).unwrap();
        let report = execute(table, &script.steps, &sink);
        (report, sink)
    }

    #[test]
    fn test_rename_then_use_by_new_name() {
        let mut table = people();
        let (report, _) = run(
            &mut table,
            "rn @\"amount\" \"Total\"\nuse @\"id\"\nuse @\"Total\"\n",
        );
        assert!(report.is_ok());
        assert_eq!(report.applied, 3);

        let sink = MemorySink::new();
        let out = report
            .selection
            .project(table.width(), DefaultProjection::All)
            .apply(&table, &sink)
            .unwrap();
        assert_eq!(out.header, strings(&["id", "Total"]));
        assert_eq!(out.rows, vec![strings(&["1", "10"]), strings(&["2", "20"])]);
    }

    #[test]
    fn test_add_shifts_later_references() {
        let mut table = people();
        let (report, _) = run(&mut table, "add @1 \"Notes\"\nset @2 \"X\"\n");
        assert!(report.is_ok());
        assert_eq!(table.header(), strings(&["id", "Notes", "name", "amount"]).as_slice());
        assert_eq!(table.rows()[0], strings(&["1", "", "X", "10"]));
        assert_eq!(table.rows()[1], strings(&["2", "", "X", "20"]));
    }

    #[test]
    fn test_unresolved_use_leaves_selection() {
        let mut table = people();
        let (before, _) = run(&mut table, "use @2\n");
        let mut table = people();
        let (after, sink) = run(&mut table, "use @2\nuse @\"Missing\"\n");

        assert_eq!(before.selection, after.selection);
        assert_eq!(after.skipped.len(), 1);
        assert_eq!(after.skipped[0].line, 2);
        assert_eq!(after.skipped[0].command, "use");
        assert!(sink.warnings()[0].contains("@\"Missing\" not found"));
    }

    #[test]
    fn test_failed_operation_changes_nothing() {
        let mut table = people();
        let (report, _) = run(
            &mut table,
            "move @0 @7\nswap @\"nope\" @1\nreplace @9 a b\nrn name \"x\"\n",
        );
        assert_eq!(report.skipped.len(), 4);
        assert_eq!(table, people());
        assert!(report.selection.touched().is_empty());
    }

    #[test]
    fn test_move_then_back_is_identity() {
        let mut table = people();
        let (report, _) = run(&mut table, "move @0 @2\n");
        assert!(report.is_ok());
        assert_eq!(table.header(), strings(&["name", "amount", "id"]).as_slice());
        run(&mut table, "move @2 @0\n");
        assert_eq!(table, people());
    }

    #[test]
    fn test_move_resolves_both_ends_first() {
        let mut table = people();
        run(&mut table, "move @\"id\" @\"amount\"\n");
        assert_eq!(table.header(), strings(&["name", "amount", "id"]).as_slice());

        let mut table = people();
        run(&mut table, "move @2 @0\n");
        assert_eq!(table.header(), strings(&["amount", "id", "name"]).as_slice());
        assert_eq!(table.rows()[1], strings(&["20", "2", "Bob"]));
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let mut table = people();
        run(&mut table, "swap @0 @\"amount\"\n");
        assert_eq!(table.header(), strings(&["amount", "name", "id"]).as_slice());
        run(&mut table, "swap @0 @2\n");
        assert_eq!(table, people());
    }

    #[test]
    fn test_replace_scopes() {
        let mut table = Table::new(
            strings(&["price $", "tax $"]),
            vec![strings(&["$5", "$1"]), strings(&["$7", "$2"])],
        );
        run(&mut table, "replace @1 \"$\" \"\"\n");
        assert_eq!(table.rows()[0], strings(&["$5", "1"]));
        assert_eq!(table.header(), strings(&["price $", "tax $"]).as_slice());

        run(&mut table, "replace_head \" $\" \"\"\n");
        assert_eq!(table.header(), strings(&["price", "tax"]).as_slice());

        run(&mut table, "replace_cell \"$\" \"USD \"\n");
        assert_eq!(table.rows()[1], strings(&["USD 7", "2"]));

        run(&mut table, "replace_all \"USD\" \"EUR\"\nreplace_all \"a\" \"A\"\n");
        assert_eq!(table.header(), strings(&["price", "tAx"]).as_slice());
        assert_eq!(table.rows()[0], strings(&["EUR 5", "1"]));
    }

    #[test]
    fn test_replace_is_literal() {
        let mut table = Table::new(strings(&["a"]), vec![strings(&["x.y.z"])]);
        run(&mut table, "replace_cell \".\" \"-\"\n");
        assert_eq!(table.rows()[0], strings(&["x-y-z"]));
    }

    #[test]
    fn test_empty_find_inserts_at_every_boundary() {
        let mut table = Table::new(strings(&["ab"]), vec![strings(&["c"]), strings(&[""])]);
        let (report, _) = run(&mut table, "replace_all \"\" \"-\"\n");
        assert!(report.is_ok());
        assert_eq!(table.header(), strings(&["-a-b-"]).as_slice());
        assert_eq!(table.rows()[0], strings(&["-c-"]));
        assert_eq!(table.rows()[1], strings(&["-"]));
    }

    #[test]
    fn test_unknown_and_invalid_lines() {
        let mut table = people();
        let (report, sink) = run(&mut table, "drop @1\nrn @0\nuse all\n");
        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(sink.warnings()[0].contains("unrecognized operation 'drop'"));
        assert!(sink.warnings()[1].contains("expected 2 arguments"));
        assert_eq!(report.summary(), "Executed: 1 operations, 2 skipped");
    }

    #[test]
    fn test_range_selection() {
        let mut table = people();
        let (report, _) = run(&mut table, "use @\"name\"-@5\n");
        assert!(report.is_ok());
        assert_eq!(
            report.selection.project(table.width(), DefaultProjection::All).positions(),
            &[1, 2]
        );

        let (report, sink) = run(&mut table, "use @0\nuse @2-@1\nuse @\"x\"-@2\n");
        assert_eq!(report.skipped.len(), 1);
        assert!(!report.selection.has_no_use());
        let projection = report.selection.project(table.width(), DefaultProjection::All);
        assert!(projection.is_empty());
        assert!(projection.apply(&table, &sink).is_none());
        assert!(sink.warnings().iter().any(|w| w.contains("No output columns")));
    }

    #[test]
    fn test_touched_tracking() {
        let mut table = people();
        let (report, _) = run(&mut table, "set @2 0\nrn @0 \"ID\"\nset @2 1\nswap @1 @2\n");
        let positions: Vec<usize> = report.selection.touched().iter().map(|t| t.position).collect();
        // the `set` column moved to 1 with the swap
        assert_eq!(positions, vec![1, 0, 2]);
        assert_eq!(
            report.selection.project(table.width(), DefaultProjection::Touched).positions(),
            &[1, 0, 2]
        );
    }

    #[test]
    fn test_touched_column_survives_insert_before_it() {
        let mut table = Table::new(strings(&["a", "b"]), vec![strings(&["1", "2"])]);
        let (report, _) = run(&mut table, "set @0 \"z\"\nadd @0 \"N\"\n");
        let sink = MemorySink::new();
        let out = report
            .selection
            .project(table.width(), DefaultProjection::Touched)
            .apply(&table, &sink)
            .unwrap();
        assert_eq!(out.header, strings(&["a", "N"]));
        assert_eq!(out.rows, vec![strings(&["z", ""])]);
    }

    #[test]
    fn test_touched_column_follows_move() {
        let mut table = people();
        let (report, _) = run(&mut table, "set @\"name\" \"x\"\nmove @0 @2\n");
        let sink = MemorySink::new();
        let out = report
            .selection
            .project(table.width(), DefaultProjection::Touched)
            .apply(&table, &sink)
            .unwrap();
        assert_eq!(out.header, strings(&["name", "id"]));
        assert_eq!(out.rows[0], strings(&["x", "1"]));
    }

    #[test]
    fn test_duplicate_use_single_column() {
        let mut table = people();
        let (report, _) = run(&mut table, "use @0\nuse @0\n");
        assert_eq!(
            report.selection.project(table.width(), DefaultProjection::All).positions(),
            &[0]
        );
    }
}
