//! Leveled log entries and the sinks that receive them.
//!
//! The engine never logs through a global. Every component that reports
//! warnings takes a `&dyn LogSink`, so the binary can route entries to
//! `tracing` while tests collect them in a [`MemorySink`].

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Log level of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
}

impl LogEntry {
    pub fn debug(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Debug, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into() }
    }
}

/// Destination for log entries.
///
/// The helper methods take `String` so the trait stays object safe.
pub trait LogSink {
    fn log(&self, entry: LogEntry);

    fn debug(&self, message: String) {
        self.log(LogEntry::debug(message));
    }

    fn info(&self, message: String) {
        self.log(LogEntry::info(message));
    }

    fn warning(&self, message: String) {
        self.log(LogEntry::warning(message));
    }

    fn error(&self, message: String) {
        self.log(LogEntry::error(message));
    }
}

/// Forwards entries to the `tracing` subscriber installed by the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Debug => tracing::debug!("{}", entry.message),
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warning => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries logged so far, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Messages at the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warning)
    }
}

impl LogSink for MemorySink {
    fn log(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}
