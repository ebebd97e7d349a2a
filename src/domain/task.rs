//! Task domain model
//!
//! A task is one card on the board. It sits in exactly one [`Stage`]; where
//! it sits inside that stage is owned by the store, not by the task.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::id::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Unknown stage '{0}' (expected pending, active or complete)")]
    UnknownStage(String),

    #[error("Unknown category '{0}' (expected work, personal or urgent)")]
    UnknownCategory(String),

    #[error("Unknown priority '{0}' (expected high, medium or low)")]
    UnknownPriority(String),
}

/// Workflow stage of a task
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    #[serde(alias = "todo")]
    Pending,
    #[serde(alias = "in-progress", alias = "in_progress")]
    Active,
    #[serde(alias = "done")]
    Complete,
}

impl Stage {
    /// All stages in board order
    pub const ALL: [Stage; 3] = [Stage::Pending, Stage::Active, Stage::Complete];

    /// Column position of this stage on the board
    pub fn index(self) -> usize {
        match self {
            Stage::Pending => 0,
            Stage::Active => 1,
            Stage::Complete => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Active => "active",
            Stage::Complete => "complete",
        }
    }

    /// Column heading
    pub fn label(self) -> &'static str {
        match self {
            Stage::Pending => "To Do",
            Stage::Active => "In Progress",
            Stage::Complete => "Done",
        }
    }

    /// The stage to the right on the board, if any
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Pending => Some(Stage::Active),
            Stage::Active => Some(Stage::Complete),
            Stage::Complete => None,
        }
    }

    /// The stage to the left on the board, if any
    pub fn prev(self) -> Option<Stage> {
        match self {
            Stage::Pending => None,
            Stage::Active => Some(Stage::Pending),
            Stage::Complete => Some(Stage::Active),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "todo" => Ok(Stage::Pending),
            "active" | "in-progress" | "in_progress" | "doing" => Ok(Stage::Active),
            "complete" | "done" => Ok(Stage::Complete),
            _ => Err(LabelError::UnknownStage(s.to_string())),
        }
    }
}

/// Fixed task categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Work,
    Personal,
    Urgent,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Urgent];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "urgent" => Ok(Category::Urgent),
            _ => Err(LabelError::UnknownCategory(s.to_string())),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(LabelError::UnknownPriority(s.to_string())),
        }
    }
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the store
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Free-form details
    #[serde(default)]
    pub description: String,

    /// Stage column the task belongs to
    #[serde(alias = "status")]
    pub stage: Stage,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub priority: Priority,

    /// Calendar date the task is due
    #[serde(alias = "dueDate")]
    pub due_date: NaiveDate,

    /// When the task was created (never changes)
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from a draft with store-assigned identity
    pub fn from_draft(id: TaskId, draft: TaskDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            stage: draft.stage,
            category: draft.category,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at,
        }
    }

    /// Returns true if the due date has passed and the task is not complete
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.stage != Stage::Complete
    }

    /// Sets the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Sets the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }
}

/// Task payload without identity, used to add a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// Stage the task is appended to
    pub stage: Stage,
    pub category: Category,
    pub priority: Priority,
    pub due_date: NaiveDate,
}

impl TaskDraft {
    /// Creates a pending draft with default category and priority
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            stage: Stage::default(),
            category: Category::default(),
            priority: Priority::default(),
            due_date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn in_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}
