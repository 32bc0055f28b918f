//! Tokenizer for operation lines.
//!
//! One regex with ordered alternatives, tried leftmost-first at each position:
//!
//! 1. column range: `@2-@4`, `@"From"-@"To"`
//! 2. named column: `@"Name"`
//! 3. positional column: `@12`
//! 4. quoted literal: `"text with spaces"`, `""`
//! 5. any other run of non-whitespace
//!
//! A bare word starting with `#` ends the line.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

use crate::engine::ColumnRef;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<range>@(?P<from>\d+\b|"[^"]+")-@(?P<to>\d+\b|"[^"]+"))"#,
        r#"|(?P<named>@"[^"]+")"#,
        r#"|(?P<pos>@\d+\b)"#,
        r#"|(?P<lit>"[^"]*")"#,
        r#"|(?P<word>\S+)"#,
    ))
    .expect("token pattern is valid")
});

/// A lexical token of an operation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `@a-@b`
    Range(ColumnRef, ColumnRef),
    /// `@N` or `@"Name"`
    Column(ColumnRef),
    /// Quoted text, quotes removed
    Literal(String),
    /// Anything else
    Word(String),
}

impl Token {
    fn from_captures(caps: &Captures<'_>) -> Self {
        if caps.name("range").is_some() {
            let from = caps.name("from").map_or("", |m| m.as_str());
            let to = caps.name("to").map_or("", |m| m.as_str());
            return Token::Range(body_ref(from), body_ref(to));
        }
        if let Some(m) = caps.name("named").or_else(|| caps.name("pos")) {
            return Token::Column(ColumnRef::parse(m.as_str()));
        }
        if let Some(m) = caps.name("lit") {
            let quoted = m.as_str();
            return Token::Literal(quoted[1..quoted.len() - 1].to_string());
        }
        Token::Word(caps.get(0).map_or("", |m| m.as_str()).to_string())
    }

    /// Read this token where a column is expected.
    pub fn to_column(&self) -> ColumnRef {
        match self {
            Token::Column(c) => c.clone(),
            Token::Word(w) => ColumnRef::parse(w),
            other => ColumnRef::Malformed(other.to_string()),
        }
    }

    /// Read this token where literal text is expected; surrounding quotes
    /// are dropped.
    pub fn to_text(&self) -> String {
        match self {
            Token::Literal(s) => s.clone(),
            Token::Word(w) => w.trim_matches('"').to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(w) if w == word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Range(a, b) => write!(f, "{}-{}", a, b),
            Token::Column(c) => write!(f, "{}", c),
            Token::Literal(s) => write!(f, "\"{}\"", s),
            Token::Word(w) => f.write_str(w),
        }
    }
}

fn body_ref(body: &str) -> ColumnRef {
    ColumnRef::parse_body(body).unwrap_or_else(|| ColumnRef::Malformed(format!("@{}", body)))
}

/// Split an operation line into tokens, stopping at a trailing `#` comment.
pub fn tokenize(line: &str) -> Vec<Token> {
    TOKEN_RE
        .captures_iter(line)
        .map(|caps| Token::from_captures(&caps))
        .take_while(|t| !matches!(t, Token::Word(w) if w.starts_with('#')))
        .collect()
}
