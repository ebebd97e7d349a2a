//! Task identifiers
//!
//! ID Format:
//! - Minted IDs: `t-{sequence}` (e.g., `t-12`)
//! - Imported IDs: any non-empty string without whitespace (e.g., `1737052800000`)
//!
//! The sequence is monotonic and persisted with the board, so an ID is never
//! issued twice, even after the task holding it is deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "t-";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Task ID cannot be empty")]
    Empty,

    #[error("Invalid task ID '{0}': IDs cannot contain whitespace")]
    Whitespace(String),
}

/// Opaque task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Creates the ID minted for a given sequence number
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{PREFIX}{sequence}"))
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the sequence number if this ID was minted by an [`IdSequence`]
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(PREFIX)?.parse().ok()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Monotonic source of fresh task IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    /// Creates a sequence whose next ID uses `next`
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// Returns the sequence number the next issued ID will carry
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns true once every sequence number has been used
    pub fn is_exhausted(&self) -> bool {
        self.next == u64::MAX
    }

    /// Issues a fresh ID and advances the sequence
    ///
    /// Returns `None` once the sequence is exhausted.
    pub fn issue(&mut self) -> Option<TaskId> {
        if self.is_exhausted() {
            return None;
        }
        let id = TaskId::from_sequence(self.next);
        self.next += 1;
        Some(id)
    }

    /// Advances past an existing ID so it is never issued again
    pub fn observe(&mut self, id: &TaskId) {
        if let Some(seq) = id.sequence() {
            if seq >= self.next {
                self.next = seq.checked_add(1).unwrap_or(u64::MAX);
            }
        }
    }
}
