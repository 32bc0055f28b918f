//! Column references and their resolution against a header.
//!
//! A reference is either positional (`@3`) or named (`@"Amount"`). It is
//! resolved against the header as it stands when the operation runs, never
//! ahead of time: `add`, `move` and `swap` shift positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker that starts every column reference
pub const REF_MARKER: char = '@';

/// A parsed column reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRef {
    /// `@N`, 0-based
    Position(usize),
    /// `@"Name"`, first header entry with that exact name
    Name(String),
    /// Text in a column slot that is not a reference; never resolves
    Malformed(String),
}

impl ColumnRef {
    /// Parse a reference including its leading `@`.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix(REF_MARKER) {
            Some(body) => Self::parse_body(body).unwrap_or_else(|| Self::Malformed(text.to_string())),
            None => Self::Malformed(text.to_string()),
        }
    }

    /// Parse the part after `@`: digits or a quoted name.
    pub fn parse_body(body: &str) -> Option<Self> {
        if body.len() >= 2 && body.starts_with('"') && body.ends_with('"') {
            return Some(Self::Name(body[1..body.len() - 1].to_string()));
        }
        if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
            return body.parse::<usize>().ok().map(Self::Position);
        }
        None
    }

    /// Resolve against a header snapshot.
    ///
    /// Returns `None` for an out-of-range position, an absent name, or a
    /// malformed reference.
    pub fn resolve(&self, header: &[String]) -> Option<usize> {
        match self {
            Self::Position(idx) => (*idx < header.len()).then_some(*idx),
            Self::Name(name) => header.iter().position(|h| h == name),
            Self::Malformed(_) => None,
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(idx) => write!(f, "{}{}", REF_MARKER, idx),
            Self::Name(name) => write!(f, "{}\"{}\"", REF_MARKER, name),
            Self::Malformed(text) => f.write_str(text),
        }
    }
}

/// Resolve a textual reference against a header.
///
/// Text that does not start with `@` is not a column reference and yields
/// `None`, as does any reference that does not match the header.
pub fn resolve(text: &str, header: &[String]) -> Option<usize> {
    if !text.starts_with(REF_MARKER) {
        return None;
    }
    ColumnRef::parse(text).resolve(header)
}
