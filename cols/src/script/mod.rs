//! Script loading
//!
//! This module provides:
//! - `token`: ordered-alternative tokenizer for operation lines
//! - `directive`: `in <key> <value>` input directives
//! - `operations`: the operation set and its line parser
//!
//! ## Usage Flow
//!
//! ```text
//! script text → Script::parse → (directives, row window, input format, steps) → engine
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cols::script::{Operation, Script};
//!
//! let script = Script::parse("in head 5\nrn @0 \"ID\"\nuse @0\n").unwrap();
//! assert_eq!(script.window.head, Some(5));
//! assert_eq!(script.steps.len(), 2);
//! assert!(matches!(script.steps[0].operation, Operation::Rename { .. }));
//! ```

pub mod directive;
pub mod operations;
pub mod token;

pub use directive::{Delimiter, Directive, Directives, InputFormat};
pub use operations::{operations_description, sample_script, Operation, UseTarget};
pub use token::{tokenize, Token};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::RowWindow;
use crate::error::ScriptResult;

/// One operation line with its position in the script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based line number
    pub line: usize,
    /// Line text as written, trimmed
    pub source: String,
    pub operation: Operation,
}

/// A parsed script. Read-only once built and shared by every input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Raw `in` directives
    pub directives: Directives,
    /// Row bounds lifted from the directives
    pub window: RowWindow,
    /// Field delimiter and quote lifted from the directives
    pub format: InputFormat,
    /// Operations in script order
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse script text.
    ///
    /// Fails only on directive values that cannot be used. Bad operation
    /// lines are kept and reported when executed.
    pub fn parse(text: &str) -> ScriptResult<Self> {
        let mut directives = Directives::new();
        let mut steps = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut words = line.split_whitespace();
            if words.next() == Some("in") {
                match words.next() {
                    Some(key) => {
                        let value = words.next().map(unquote);
                        directives.insert(key, value, line_no);
                    }
                    None => steps.push(Step {
                        line: line_no,
                        source: line.to_string(),
                        operation: Operation::Invalid {
                            keyword: "in".to_string(),
                            reason: "missing directive name".to_string(),
                        },
                    }),
                }
                continue;
            }

            steps.push(Step {
                line: line_no,
                source: line.to_string(),
                operation: Operation::parse(line),
            });
        }

        Ok(Self {
            window: RowWindow::from_directives(&directives)?,
            format: InputFormat::from_directives(&directives)?,
            directives,
            steps,
        })
    }

    /// Read and parse a script file.
    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Serialize to JSON for `cols check`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `";"` → `;`. A lone quote character stays as is.
fn unquote(value: &str) -> String {
    let quoted = value.len() > 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}
