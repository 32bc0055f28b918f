//! Row window: `skip`, `head`, `tail`, `trunc` and `max` bounds.
//!
//! Bounds are applied in that fixed order, each to the output of the
//! previous one.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::ScriptResult;
use crate::script::Directives;

/// Row bounds parsed from the `in` directives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWindow {
    /// Drop the first N rows
    pub skip: Option<usize>,
    /// Keep the first N rows
    pub head: Option<usize>,
    /// Keep the last N rows
    pub tail: Option<usize>,
    /// Drop the last N rows
    pub trunc: Option<usize>,
    /// Keep at most N rows
    pub max: Option<usize>,
}

impl RowWindow {
    /// Validate the numeric directives. A malformed value fails the run.
    pub fn from_directives(directives: &Directives) -> ScriptResult<Self> {
        Ok(Self {
            skip: directives.count("skip")?,
            head: directives.count("head")?,
            tail: directives.count("tail")?,
            trunc: directives.count("trunc")?,
            max: directives.count("max")?,
        })
    }

    /// True when no bound is set
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let mut rows = rows;
        if let Some(n) = self.skip {
            rows.drain(..n.min(rows.len()));
        }
        if let Some(n) = self.head {
            rows.truncate(n);
        }
        if let Some(n) = self.tail {
            rows = keep_last(rows, n);
        }
        if let Some(n) = self.trunc {
            rows.truncate(rows.len().saturating_sub(n));
        }
        if let Some(n) = self.max {
            rows.truncate(n);
        }
        rows
    }
}

/// Keep the last `n` items using a window of at most `n` entries.
fn keep_last<T>(rows: Vec<T>, n: usize) -> Vec<T> {
    if n == 0 {
        return Vec::new();
    }
    let mut window = VecDeque::with_capacity(n.min(rows.len()));
    for row in rows {
        if window.len() == n {
            window.pop_front();
        }
        window.push_back(row);
    }
    window.into()
}
