//! Selection state and output projection.
//!
//! `use` lines and mutating operations feed a [`Selection`] while the script
//! runs. Once every operation is done, [`Selection::project`] turns it into
//! the ordered list of positions to write. Precedence, highest first:
//!
//! 1. any `use all`: every column
//! 2. a `use @a-@b` range, clipped to the final header
//! 3. single `use` positions, first-use order, no duplicates
//! 4. the run's [`DefaultProjection`]

use crate::config::DefaultProjection;
use crate::engine::table::{Row, Table};
use crate::error::ProjectionError;
use crate::logs::LogSink;

/// A column position targeted by a mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Touch {
    pub position: usize,
    /// Command that touched it first
    pub command: String,
}

/// Output selection accumulated during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    all: bool,
    range: Option<(usize, usize)>,
    columns: Vec<usize>,
    touched: Vec<Touch>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_all(&mut self) {
        self.all = true;
    }

    /// Record an inclusive range; a later range replaces an earlier one.
    pub fn use_range(&mut self, start: usize, end: usize) {
        self.range = Some((start, end));
    }

    pub fn use_column(&mut self, position: usize) {
        if !self.columns.contains(&position) {
            self.columns.push(position);
        }
    }

    pub fn touch(&mut self, position: usize, command: &str) {
        if !self.touched.iter().any(|t| t.position == position) {
            self.touched.push(Touch {
                position,
                command: command.to_string(),
            });
        }
    }

    pub fn touched(&self) -> &[Touch] {
        &self.touched
    }

    /// An empty column was inserted at `idx`.
    pub fn column_inserted(&mut self, idx: usize) {
        self.remap_touched(|p| if p >= idx { p + 1 } else { p });
    }

    /// The column at `from` was removed and re-inserted at `to`.
    pub fn column_moved(&mut self, from: usize, to: usize) {
        self.remap_touched(|p| {
            if p == from {
                return to;
            }
            let p = if p > from { p - 1 } else { p };
            if p >= to {
                p + 1
            } else {
                p
            }
        });
    }

    pub fn columns_swapped(&mut self, a: usize, b: usize) {
        self.remap_touched(|p| match p {
            p if p == a => b,
            p if p == b => a,
            p => p,
        });
    }

    // Touched entries follow their column; `use` positions stay as resolved.
    fn remap_touched(&mut self, map: impl Fn(usize) -> usize) {
        for touch in &mut self.touched {
            touch.position = map(touch.position);
        }
    }

    /// True if no `use` line took effect
    pub fn has_no_use(&self) -> bool {
        !self.all && self.range.is_none() && self.columns.is_empty()
    }

    /// Final positions for a header of `width` columns.
    pub fn project(&self, width: usize, fallback: DefaultProjection) -> Projection {
        let positions = if self.all {
            (0..width).collect()
        } else if let Some((start, end)) = self.range {
            (start..=end).take_while(|&i| i < width).collect()
        } else if !self.columns.is_empty() {
            self.columns.clone()
        } else {
            match fallback {
                DefaultProjection::All => (0..width).collect(),
                DefaultProjection::Touched => self.touched.iter().map(|t| t.position).collect(),
            }
        };
        Projection { positions }
    }
}

/// Ordered output positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    positions: Vec<usize>,
}

/// Header and rows ready to be written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectedTable {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Projection {
    pub fn new(positions: Vec<usize>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pick the projected fields of one row.
    pub fn project_row(&self, row: &[String]) -> Result<Row, ProjectionError> {
        self.positions
            .iter()
            .map(|&position| {
                row.get(position).cloned().ok_or(ProjectionError {
                    position,
                    width: row.len(),
                })
            })
            .collect()
    }

    /// Project a whole table.
    ///
    /// Returns `None`, after a warning, when there is nothing to write. Rows
    /// that fail to project are logged and dropped.
    pub fn apply(&self, table: &Table, log: &dyn LogSink) -> Option<ProjectedTable> {
        if self.is_empty() {
            log.warning("No output columns selected; nothing written for this input".to_string());
            return None;
        }
        let header = match self.project_row(table.header()) {
            Ok(header) => header,
            Err(e) => {
                log.warning(format!("Cannot project header: {}; nothing written for this input", e));
                return None;
            }
        };
        log.debug(format!("Output columns: {}", header.join(", ")));

        let mut rows = Vec::with_capacity(table.row_count());
        for (n, row) in table.rows().iter().enumerate() {
            match self.project_row(row) {
                Ok(out) => rows.push(out),
                Err(e) => log.error(format!("Row {} skipped: {}", n, e)),
            }
        }
        Some(ProjectedTable { header, rows })
    }
}
