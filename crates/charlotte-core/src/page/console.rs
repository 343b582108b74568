//! Bounded per-tab console message ring buffer (§4.8 "Network/console capture").

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of console messages retained per tab; oldest entries are evicted on overflow.
/// Per design note §9(c), this cap is arbitrary and only matters for observability.
pub const CONSOLE_BUFFER_MAX: usize = 1000;

/// Severity ordering for console messages, used to filter `getConsoleMessages(level)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleLevel {
    /// Verbose debug output.
    Debug = 0,
    /// Informational logging.
    Info = 1,
    /// Warnings.
    Warning = 2,
    /// Errors.
    Error = 3,
}

impl ConsoleLevel {
    /// `true` if a message at `self` should be included when the caller asked for `minimum`.
    #[must_use]
    pub const fn includes(self, minimum: Self) -> bool {
        (self as u8) >= (minimum as u8)
    }
}

/// A single captured console message.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleMessage {
    /// Message severity.
    pub level: ConsoleLevel,
    /// Message text.
    pub text: String,
    /// Page-relative timestamp in milliseconds.
    pub timestamp: f64,
    /// Source URL, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source line number, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,
}

/// A bounded ring buffer of console messages for one tab.
#[derive(Debug, Default)]
pub struct ConsoleBuffer {
    messages: VecDeque<ConsoleMessage>,
}

impl ConsoleBuffer {
    /// Construct an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a message, evicting the oldest entry if the buffer is at capacity.
    pub fn push(&mut self, message: ConsoleMessage) {
        if self.messages.len() >= CONSOLE_BUFFER_MAX {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// All messages at or above `minimum` severity, oldest first.
    #[must_use]
    pub fn messages(&self, minimum: ConsoleLevel) -> Vec<&ConsoleMessage> {
        self.messages.iter().filter(|m| m.level.includes(minimum)).collect()
    }

    /// `true` if any buffered message is at `Warning` or `Error` level (the legacy
    /// `console_errors` view referenced in §4.8).
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level >= ConsoleLevel::Warning)
    }

    /// Number of buffered messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` if no messages are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clear all buffered messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(level: ConsoleLevel, text: &str) -> ConsoleMessage {
        ConsoleMessage { level, text: text.into(), timestamp: 0.0, url: None, line_number: None }
    }

    #[test]
    fn evicts_oldest_over_cap() {
        let mut buf = ConsoleBuffer::new();
        for i in 0..CONSOLE_BUFFER_MAX + 5 {
            buf.push(msg(ConsoleLevel::Info, &format!("m{i}")));
        }
        assert_eq!(buf.len(), CONSOLE_BUFFER_MAX);
        let remaining = buf.messages(ConsoleLevel::Debug);
        assert_eq!(remaining.first().unwrap().text, "m5");
    }

    #[test]
    fn level_filter_includes_more_severe_only() {
        let mut buf = ConsoleBuffer::new();
        buf.push(msg(ConsoleLevel::Debug, "d"));
        buf.push(msg(ConsoleLevel::Error, "e"));
        assert_eq!(buf.messages(ConsoleLevel::Warning).len(), 1);
        assert_eq!(buf.messages(ConsoleLevel::Debug).len(), 2);
    }
}
