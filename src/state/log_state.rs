//! Bounded log panel

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Maximum number of entries the panel retains
pub const LOG_CAPACITY: usize = 6;

/// Visual style of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStyle {
    Info,
    Response,
    Error,
}

impl LogStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            LogStyle::Info => "info",
            LogStyle::Response => "response",
            LogStyle::Error => "error",
        }
    }
}

/// One line of the log panel. `text` is stored as received and must be
/// escaped before it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub text: String,
    pub style: LogStyle,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(style: LogStyle, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
            at: Utc::now(),
        }
    }
}

/// FIFO of the most recent log entries; the oldest is evicted on overflow
#[derive(Debug, Clone, Default)]
pub struct LogPanel {
    entries: VecDeque<LogEntry>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}
