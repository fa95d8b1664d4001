//! Validation diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::table::RowId;

/// Code of the per-row unique key violation message.
pub const MSGCODE_UNIQUE_KEY_VIOLATION: &str = "UKV-001";

/// Code of the summary emitted when a key exceeds the violation cap.
pub const MSGCODE_TOO_MANY_UNIQUE_KEY_VIOLATIONS: &str = "UKV-002";

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Info,
    /// Suspicious content.
    Warning,
    /// Invalid content.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stable message code.
    pub code: String,
    /// Human readable text.
    pub text: String,
    /// Severity.
    pub severity: Severity,
    /// Row the message refers to.
    pub row: Option<RowId>,
    /// Zero-based position of that row when the message was created.
    pub row_index: Option<usize>,
    /// Unique key the message refers to.
    pub unique_key: Option<String>,
    /// Column positions participating in the key.
    pub columns: Vec<usize>,
    /// Violation cap, set on the summary message only.
    pub limit: Option<usize>,
}

impl Message {
    /// A row violates a unique key.
    #[must_use]
    pub fn unique_key_violation(
        unique_key: &str,
        row: RowId,
        row_index: usize,
        columns: Vec<usize>,
        overlapping: bool,
    ) -> Self {
        let what = if overlapping {
            "overlap with"
        } else {
            "duplicate"
        };
        Self {
            code: MSGCODE_UNIQUE_KEY_VIOLATION.to_string(),
            text: format!(
                "The values of unique key '{unique_key}' in row {} {what} another row.",
                row_index + 1
            ),
            severity: Severity::Error,
            row: Some(row),
            row_index: Some(row_index),
            unique_key: Some(unique_key.to_string()),
            columns,
            limit: None,
        }
    }

    /// A unique key has more violations than `limit`.
    #[must_use]
    pub fn too_many_violations(unique_key: &str, columns: Vec<usize>, limit: usize) -> Self {
        Self {
            code: MSGCODE_TOO_MANY_UNIQUE_KEY_VIOLATIONS.to_string(),
            text: format!(
                "Unique key '{unique_key}' is violated by more than {limit} rows; further violations are not reported."
            ),
            severity: Severity::Error,
            row: None,
            row_index: None,
            unique_key: Some(unique_key.to_string()),
            columns,
            limit: Some(limit),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.severity, self.text)
    }
}

/// Ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn add(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Appends all messages of another list.
    pub fn extend(&mut self, other: MessageList) {
        self.messages.extend(other.messages);
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Highest severity present.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.messages.iter().map(|m| m.severity).max()
    }

    /// Returns true if any message is an error.
    #[must_use]
    pub fn contains_errors(&self) -> bool {
        self.severity() == Some(Severity::Error)
    }

    /// First message with the given code.
    #[must_use]
    pub fn message_by_code(&self, code: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.code == code)
    }

    /// Messages referring to a row.
    pub fn for_row(&self, row: RowId) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.row == Some(row))
    }

    /// Messages referring to a unique key.
    pub fn for_unique_key<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |m| m.unique_key.as_deref() == Some(name))
    }

    /// Keeps the messages matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Message) -> bool) {
        self.messages.retain(keep);
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<Message> for MessageList {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
