//! Script operations
//!
//! Every non-directive script line becomes one [`Operation`]. Lines that
//! cannot be understood are kept as [`Operation::Unknown`] or
//! [`Operation::Invalid`] so the executor can warn about them in order.

use serde::{Deserialize, Serialize};

use super::token::{tokenize, Token};
use crate::engine::ColumnRef;

/// What a `use` line selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseTarget {
    /// `use all`
    All,
    /// `use @a-@b`, inclusive
    Range { start: ColumnRef, end: ColumnRef },
    /// `use @a`
    Column(ColumnRef),
}

/// All available operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Operation {
    /// Select output columns
    Use { target: UseTarget },

    /// Rename a column
    Rename { column: ColumnRef, name: String },

    /// Insert an empty column before the referenced one
    Add { column: ColumnRef, name: String },

    /// Overwrite every field of a column
    Set { column: ColumnRef, value: String },

    /// Substitute in header and cells
    ReplaceAll { find: String, replace: String },

    /// Substitute in header only
    ReplaceHead { find: String, replace: String },

    /// Substitute in cells only
    ReplaceCell { find: String, replace: String },

    /// Substitute in one column's cells
    Replace {
        column: ColumnRef,
        find: String,
        replace: String,
    },

    /// Move a column to another position
    Move { from: ColumnRef, to: ColumnRef },

    /// Exchange two columns
    Swap { a: ColumnRef, b: ColumnRef },

    /// Unrecognized command
    Unknown { keyword: String },

    /// Known command with unusable arguments
    Invalid { keyword: String, reason: String },
}

impl Operation {
    /// Parse one operation line.
    pub fn parse(line: &str) -> Self {
        let tokens = tokenize(line);
        let Some((head, args)) = tokens.split_first() else {
            return Operation::Unknown { keyword: String::new() };
        };
        let command = head.to_string();

        let arity = match command.as_str() {
            "use" => 1,
            "rn" | "add" | "set" | "move" | "swap" => 2,
            "replace_all" | "replace_head" | "replace_cell" => 2,
            "replace" => 3,
            _ => return Operation::Unknown { keyword: command },
        };
        if args.len() < arity {
            return Operation::Invalid {
                reason: format!(
                    "expected {} argument{}, got {}",
                    arity,
                    if arity == 1 { "" } else { "s" },
                    args.len()
                ),
                keyword: command,
            };
        }

        match command.as_str() {
            "use" => Operation::Use {
                target: parse_use_target(&args[0]),
            },
            "rn" => Operation::Rename {
                column: args[0].to_column(),
                name: args[1].to_text(),
            },
            "add" => Operation::Add {
                column: args[0].to_column(),
                name: args[1].to_text(),
            },
            "set" => Operation::Set {
                column: args[0].to_column(),
                value: args[1].to_text(),
            },
            "replace_all" => Operation::ReplaceAll {
                find: args[0].to_text(),
                replace: args[1].to_text(),
            },
            "replace_head" => Operation::ReplaceHead {
                find: args[0].to_text(),
                replace: args[1].to_text(),
            },
            "replace_cell" => Operation::ReplaceCell {
                find: args[0].to_text(),
                replace: args[1].to_text(),
            },
            "replace" => Operation::Replace {
                column: args[0].to_column(),
                find: args[1].to_text(),
                replace: args[2].to_text(),
            },
            "move" => Operation::Move {
                from: args[0].to_column(),
                to: args[1].to_column(),
            },
            _ => Operation::Swap {
                a: args[0].to_column(),
                b: args[1].to_column(),
            },
        }
    }

    /// Script keyword of this operation
    pub fn command(&self) -> &str {
        match self {
            Operation::Use { .. } => "use",
            Operation::Rename { .. } => "rn",
            Operation::Add { .. } => "add",
            Operation::Set { .. } => "set",
            Operation::ReplaceAll { .. } => "replace_all",
            Operation::ReplaceHead { .. } => "replace_head",
            Operation::ReplaceCell { .. } => "replace_cell",
            Operation::Replace { .. } => "replace",
            Operation::Move { .. } => "move",
            Operation::Swap { .. } => "swap",
            Operation::Unknown { keyword } | Operation::Invalid { keyword, .. } => keyword,
        }
    }

    /// Whether the executor can run this operation at all
    pub fn is_runnable(&self) -> bool {
        !matches!(self, Operation::Unknown { .. } | Operation::Invalid { .. })
    }
}

fn parse_use_target(token: &Token) -> UseTarget {
    match token {
        t if t.is_word("all") => UseTarget::All,
        Token::Range(start, end) => UseTarget::Range {
            start: start.clone(),
            end: end.clone(),
        },
        t => UseTarget::Column(t.to_column()),
    }
}

/// Script reference printed by `cols help-conf`
pub fn operations_description() -> String {
    r#"
cols script reference
=====================

A script holds one instruction per line. Blank lines and lines starting
with '#' are ignored; a bare '#' word ends an operation line.

Input directives (start with 'in '):
    in head N      # Keep only the first N rows (excluding header)
    in tail N      # Keep only the last N rows
    in skip N      # Drop the first N rows
    in trunc N     # Drop the last N rows
    in max N       # Keep at most N rows
    in delim ,     # Input field delimiter (default ','; 'tab' or 'auto' allowed)
    in str "       # Input quote character (default '"')

Row bounds apply in the order skip, head, tail, trunc, max.

Column references:
    @N             # Column at index N (zero-based)
    @"Name"        # First column named Name

Operations:
    use @N                 # Output column N
    use @"Name"            # Output column Name
    use all                # Output all columns (overrides other use lines)
    use @N-@M              # Output columns N through M (inclusive)
    rn @N "New"            # Rename column N to "New"
    add @N "NewCol"        # Insert an empty column at position N
    set @N X               # Set all values in column N to X
    replace_all A B        # Replace A with B in headers and cells
    replace_head A B       # Replace A with B in headers
    replace_cell A B       # Replace A with B in cells
    replace @N A B         # Replace A with B in column N
    move @A @B             # Move column A to position B
    swap @A @B             # Swap columns A and B

References resolve against the header as changed by earlier lines.
Replacements are plain text, not patterns. A line whose column cannot be
found is skipped with a warning.

Without any 'use' line every column is written (see --default-projection).
"#
    .to_string()
}

/// Sample script printed by `cols sample`
pub fn sample_script() -> String {
    r#"# cols sample.conf - every feature with inline explanations

# ---- Input directives ----

in delim ,      # Comma separated input (default)
in str "        # Double quote strings (default)
in head 100     # Keep the first 100 rows (excluding header)
in tail 50      # Then keep the last 50 of those
in skip 2       # Drop the first 2 rows (applied before head)
in trunc 1      # Drop the last row
in max 20       # Keep at most 20 rows

# ---- Column operations ----

rn @0 "ID"                      # Rename column 0 to "ID"
rn @"First Name" "Name"         # Rename column "First Name" to "Name"
add @2 "Notes"                  # Insert a column named "Notes" at position 2
set @1 "Processed"              # Set every cell in column 1 to "Processed"
use @"ID"                       # Output the column named "ID"
use @"Name"                     # Output the column named "Name"
use @2-@4                       # Output columns 2 through 4 (inclusive)
use all                         # Output all columns (overrides other use lines)
replace_all "$" ""              # Remove dollar signs from headers and cells
replace_head "foo" "bar"        # Replace "foo" with "bar" in column names
replace_cell "abc" "XYZ"        # Replace "abc" with "XYZ" in all cells
replace @"Notes" "none" "added" # Replace "none" with "added" in "Notes"
move @0 @2                      # Move column 0 to position 2
swap @1 @2                      # Swap columns 1 and 2
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            Operation::parse(r#"rn @"amount" "Total""#),
            Operation::Rename {
                column: ColumnRef::Name("amount".into()),
                name: "Total".into(),
            }
        );
    }

    #[test]
    fn test_parse_use_forms() {
        assert_eq!(
            Operation::parse("use all"),
            Operation::Use { target: UseTarget::All }
        );
        assert_eq!(
            Operation::parse("use @1-@3"),
            Operation::Use {
                target: UseTarget::Range {
                    start: ColumnRef::Position(1),
                    end: ColumnRef::Position(3),
                }
            }
        );
        assert_eq!(
            Operation::parse("use @\"id\""),
            Operation::Use {
                target: UseTarget::Column(ColumnRef::Name("id".into()))
            }
        );
        assert_eq!(
            Operation::parse("use everything"),
            Operation::Use {
                target: UseTarget::Column(ColumnRef::Malformed("everything".into()))
            }
        );
    }

    #[test]
    fn test_bare_words_unquoted() {
        assert_eq!(
            Operation::parse("set @2 X"),
            Operation::Set {
                column: ColumnRef::Position(2),
                value: "X".into(),
            }
        );
        assert_eq!(
            Operation::parse(r#"replace @0 "a b" c"#),
            Operation::Replace {
                column: ColumnRef::Position(0),
                find: "a b".into(),
                replace: "c".into(),
            }
        );
    }

    #[test]
    fn test_unknown_and_invalid() {
        assert_eq!(
            Operation::parse("drop @1"),
            Operation::Unknown { keyword: "drop".into() }
        );
        let op = Operation::parse("move @1");
        assert!(!op.is_runnable());
        assert_eq!(op.command(), "move");
        match op {
            Operation::Invalid { reason, .. } => assert_eq!(reason, "expected 2 arguments, got 1"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(Operation::parse("use"), Operation::Invalid { .. }));
    }

    #[test]
    fn test_command_names_round_trip() {
        for line in [
            "use all",
            "rn @0 a",
            "add @0 a",
            "set @0 a",
            "replace_all a b",
            "replace_head a b",
            "replace_cell a b",
            "replace @0 a b",
            "move @0 @1",
            "swap @0 @1",
        ] {
            let op = Operation::parse(line);
            assert!(op.is_runnable(), "{}", line);
            assert_eq!(op.command(), line.split_whitespace().next().unwrap());
        }
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Operation::parse("swap @0 @\"b\"")).unwrap();
        assert_eq!(json["command"], "swap");
        assert_eq!(json["a"]["position"], 0);
        assert_eq!(json["b"]["name"], "b");
    }
}
