//! Discrete board commands
//!
//! User interfaces express every intent as a [`Command`] and hand it to
//! [`TaskStore::apply`], which runs it atomically.

use super::filter::FilterPatch;
use super::id::TaskId;
use super::store::{StoreError, TaskStore};
use super::task::{Stage, Task, TaskDraft};

/// An intent coming from a user interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTask(TaskDraft),
    UpdateTask(Task),
    DeleteTask(TaskId),
    MoveTask { id: TaskId, stage: Stage },
    /// Reorder using unfiltered stage positions
    ReorderTask { stage: Stage, from: usize, to: usize },
    /// Reorder using positions in the filtered column
    ReorderVisible { stage: Stage, from: usize, to: usize },
    SetFilters(FilterPatch),
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask(_) => "add",
            Command::UpdateTask(_) => "update",
            Command::DeleteTask(_) => "delete",
            Command::MoveTask { .. } => "move",
            Command::ReorderTask { .. } => "reorder",
            Command::ReorderVisible { .. } => "reorder_visible",
            Command::SetFilters(_) => "set_filters",
        }
    }
}

/// Result of an applied command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The task that was created
    Added(Task),
    /// The task that was deleted
    Removed(Task),
    Applied,
}

impl TaskStore {
    /// Runs a command against the store
    pub fn apply(&mut self, command: Command) -> Result<Outcome, StoreError> {
        match command {
            Command::AddTask(draft) => self.add(draft).map(Outcome::Added),
            Command::UpdateTask(task) => self.update(task).map(|()| Outcome::Applied),
            Command::DeleteTask(id) => self.remove(&id).map(Outcome::Removed),
            Command::MoveTask { id, stage } => self.move_to(&id, stage).map(|()| Outcome::Applied),
            Command::ReorderTask { stage, from, to } => {
                self.reorder(stage, from, to).map(|()| Outcome::Applied)
            }
            Command::ReorderVisible { stage, from, to } => {
                self.reorder_visible(stage, from, to).map(|()| Outcome::Applied)
            }
            Command::SetFilters(patch) => {
                self.set_filters(patch);
                Ok(Outcome::Applied)
            }
        }
    }
}
