//! Persisted board record
//!
//! A snapshot holds every task (stage by stage, each stage in manual
//! order), the current filters, and the ID sequence. Every field has a
//! default so snapshots written by older versions keep loading; unknown
//! fields are ignored.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::FilterCriteria;
use super::id::{IdSequence, TaskId};
use super::task::{Category, Priority, Stage, Task};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn current_version() -> u32 {
    SNAPSHOT_VERSION
}

/// The complete serializable state of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default = "current_version")]
    pub version: u32,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub filters: FilterCriteria,

    #[serde(default)]
    pub next_id: IdSequence,
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tasks: Vec::new(),
            filters: FilterCriteria::default(),
            next_id: IdSequence::default(),
        }
    }
}

impl BoardSnapshot {
    /// A fresh board with one example task per stage
    pub fn seeded(today: NaiveDate, now: DateTime<Utc>) -> Self {
        let examples = [
            (
                "Design System Implementation",
                "Create a comprehensive design system for the project",
                Stage::Pending,
                Priority::High,
                14,
            ),
            (
                "API Integration",
                "Integrate REST APIs for data fetching",
                Stage::Active,
                Priority::Medium,
                7,
            ),
            (
                "Testing Implementation",
                "Write unit and integration tests",
                Stage::Complete,
                Priority::Medium,
                3,
            ),
        ];

        let tasks: Vec<Task> = examples
            .into_iter()
            .zip(1u64..)
            .map(|((title, description, stage, priority, days), seq)| Task {
                id: TaskId::from_sequence(seq),
                title: title.to_string(),
                description: description.to_string(),
                stage,
                category: Category::Work,
                priority,
                due_date: today.checked_add_days(Days::new(days)).unwrap_or(today),
                created_at: now,
            })
            .collect();

        Self {
            next_id: IdSequence::starting_at(tasks.len() as u64 + 1),
            tasks,
            ..Self::default()
        }
    }

    /// Parses a snapshot from JSON
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Self::from_slice(text.as_bytes())
    }

    /// Parses a snapshot from raw JSON bytes; invalid UTF-8 is a parse error
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_slice(bytes)?;

        // Older snapshots nest the whole board under a `tasks` object
        let nested = value
            .get_mut("tasks")
            .filter(|v| v.is_object())
            .map(Value::take);
        if let Some(inner) = nested {
            value = inner;
        }

        serde_json::from_value(value)
    }

    /// Serializes the snapshot as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns true if a newer release wrote this snapshot
    pub fn is_newer_format(&self) -> bool {
        self.version > SNAPSHOT_VERSION
    }

    /// Returns the IDs of all tasks in snapshot order
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|t| &t.id)
    }
}
