//! Input directives: `in <key> [value]` lines.
//!
//! Directives are collected before any operation runs and shared by every
//! input file of a run. Values are kept as raw text here; typed views such as
//! [`InputFormat`] and [`crate::engine::RowWindow`] validate them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ScriptError, ScriptResult};

/// Keys with a meaning; anything else is stored but unused.
pub const KNOWN_KEYS: &[&str] = &["skip", "head", "tail", "trunc", "max", "delim", "str"];

/// One directive value and where it was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub value: Option<String>,
    pub line: usize,
}

/// All directives of a script. A key given twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directives {
    entries: BTreeMap<String, Directive>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>, line: usize) {
        self.entries.insert(key.into(), Directive { value, line });
    }

    pub fn get(&self, key: &str) -> Option<&Directive> {
        self.entries.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|d| d.value.as_deref())
    }

    /// Keys that no component reads
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| !KNOWN_KEYS.contains(k))
            .collect()
    }

    /// A non-negative row count, if the directive is present.
    pub fn count(&self, key: &str) -> ScriptResult<Option<usize>> {
        let Some(directive) = self.get(key) else {
            return Ok(None);
        };
        let raw = directive
            .value
            .as_deref()
            .ok_or_else(|| invalid(key, directive, "missing value"))?;
        raw.parse::<usize>().map(Some).map_err(|_| {
            invalid(
                key,
                directive,
                format!("expected a non-negative integer, got '{}'", raw),
            )
        })
    }

    /// A single-byte separator, if the directive is present.
    pub fn byte(&self, key: &str) -> ScriptResult<Option<u8>> {
        let Some(directive) = self.get(key) else {
            return Ok(None);
        };
        let raw = directive
            .value
            .as_deref()
            .ok_or_else(|| invalid(key, directive, "missing value"))?;
        parse_byte(raw)
            .map(Some)
            .ok_or_else(|| invalid(key, directive, format!("expected a single ASCII character, got '{}'", raw)))
    }
}

fn invalid(key: &str, directive: &Directive, message: impl Into<String>) -> ScriptError {
    ScriptError::InvalidDirective {
        key: key.to_string(),
        line: directive.line,
        message: message.into(),
    }
}

/// Parse a separator character. `\t`/`tab` and `space` name the characters
/// that cannot be written bare in a whitespace-split directive.
pub fn parse_byte(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" => Some(b'\t'),
        "space" => Some(b' '),
        _ => match raw.as_bytes() {
            [b] if b.is_ascii() => Some(*b),
            _ => None,
        },
    }
}

/// Field delimiter of the input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Fixed separator
    Byte(u8),
    /// Guess per file from its first line
    Auto,
}

/// How input files are split into fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFormat {
    pub delimiter: Delimiter,
    pub quote: u8,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Byte(b','),
            quote: b'"',
        }
    }
}

impl InputFormat {
    /// Read `in delim` and `in str`.
    pub fn from_directives(directives: &Directives) -> ScriptResult<Self> {
        let mut format = Self::default();
        if directives.value("delim") == Some("auto") {
            format.delimiter = Delimiter::Auto;
        } else if let Some(b) = directives.byte("delim")? {
            format.delimiter = Delimiter::Byte(b);
        }
        if let Some(q) = directives.byte("str")? {
            format.quote = q;
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_values() {
        let mut d = Directives::new();
        d.insert("head", Some("10".into()), 1);
        d.insert("tail", Some("ten".into()), 2);
        d.insert("max", None, 3);

        assert_eq!(d.count("head").unwrap(), Some(10));
        assert_eq!(d.count("skip").unwrap(), None);

        let err = d.count("tail").unwrap_err().to_string();
        assert!(err.contains("line 2"));
        assert!(err.contains("ten"));
        assert!(d.count("max").is_err());
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut d = Directives::new();
        d.insert("skip", Some("-1".into()), 1);
        assert!(d.count("skip").is_err());
    }

    #[test]
    fn test_last_value_wins() {
        let mut d = Directives::new();
        d.insert("head", Some("1".into()), 1);
        d.insert("head", Some("2".into()), 5);
        assert_eq!(d.count("head").unwrap(), Some(2));
        assert_eq!(d.get("head").unwrap().line, 5);
    }

    #[test]
    fn test_input_format() {
        let mut d = Directives::new();
        assert_eq!(InputFormat::from_directives(&d).unwrap(), InputFormat::default());

        d.insert("delim", Some(";".into()), 1);
        d.insert("str", Some("'".into()), 2);
        let format = InputFormat::from_directives(&d).unwrap();
        assert_eq!(format.delimiter, Delimiter::Byte(b';'));
        assert_eq!(format.quote, b'\'');

        d.insert("delim", Some("tab".into()), 3);
        assert_eq!(InputFormat::from_directives(&d).unwrap().delimiter, Delimiter::Byte(b'\t'));

        d.insert("delim", Some("auto".into()), 4);
        assert_eq!(InputFormat::from_directives(&d).unwrap().delimiter, Delimiter::Auto);

        d.insert("delim", Some("::".into()), 5);
        assert!(InputFormat::from_directives(&d).is_err());
    }

    #[test]
    fn test_unknown_keys_kept() {
        let mut d = Directives::new();
        d.insert("encoding", Some("latin1".into()), 1);
        d.insert("head", Some("3".into()), 2);
        assert_eq!(d.value("encoding"), Some("latin1"));
        assert_eq!(d.unknown_keys(), vec!["encoding"]);
    }
}
