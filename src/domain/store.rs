//! The task store
//!
//! Owns every task on the board plus the manual order of each stage column.
//! All mutations go through the store, which notifies its observers once
//! the change is fully applied.
//!
//! The store has no internal locking. Hosts that share it across threads
//! must serialize mutating calls, for example behind a `Mutex`.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use super::filter::{FilterCriteria, FilterPatch};
use super::id::{IdSequence, TaskId};
use super::snapshot::BoardSnapshot;
use super::task::{Stage, Task, TaskDraft};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Position {index} is out of range for stage '{stage}' ({len} tasks)")]
    OutOfRange { stage: Stage, index: usize, len: usize },

    #[error("Task {0} cannot change stage through an update; move it instead")]
    StageChange(TaskId),

    #[error("Task {0} cannot change its creation time")]
    CreatedAtChange(TaskId),

    #[error("Duplicate task ID: {0}")]
    Duplicate(TaskId),

    #[error("No task IDs left to issue")]
    IdsExhausted,
}

/// A committed change, passed to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(TaskId),
    Updated(TaskId),
    Removed(TaskId),
    Moved { id: TaskId, from: Stage, to: Stage },
    Reordered { stage: Stage, from: usize, to: usize },
    FiltersChanged,
}

/// Handle returned by [`TaskStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback run after each committed change
pub type Observer = Box<dyn FnMut(&StoreEvent, &TaskStore) + Send>;

/// In-memory board state
#[derive(Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    order: [Vec<TaskId>; 3],
    filters: FilterCriteria,
    ids: IdSequence,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks.len())
            .field("order", &self.order)
            .field("filters", &self.filters)
            .field("ids", &self.ids)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot
    ///
    /// Stage order follows the order of tasks in the snapshot.
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self, StoreError> {
        let mut store = Self {
            filters: snapshot.filters,
            ids: snapshot.next_id,
            ..Self::default()
        };

        for task in snapshot.tasks {
            if store.tasks.contains_key(&task.id) {
                return Err(StoreError::Duplicate(task.id));
            }
            store.ids.observe(&task.id);
            store.order[task.stage.index()].push(task.id.clone());
            store.tasks.insert(task.id.clone(), task);
        }

        if store.ids.is_exhausted() {
            return Err(StoreError::IdsExhausted);
        }

        Ok(store)
    }

    /// Returns an owned copy of the full state
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tasks: self.tasks_in_order().cloned().collect(),
            filters: self.filters.clone(),
            next_id: self.ids,
            ..BoardSnapshot::default()
        }
    }

    /// Number of tasks on the board
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Current filter criteria
    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Task IDs of a stage in manual order
    pub fn stage_order(&self, stage: Stage) -> &[TaskId] {
        &self.order[stage.index()]
    }

    /// Tasks of a stage in manual order
    pub fn stage_tasks(&self, stage: Stage) -> impl Iterator<Item = &Task> {
        self.order[stage.index()]
            .iter()
            .filter_map(|id| self.tasks.get(id))
    }

    /// All tasks, stage by stage, each stage in manual order
    pub fn tasks_in_order(&self) -> impl Iterator<Item = &Task> {
        Stage::ALL
            .into_iter()
            .flat_map(move |stage| self.stage_tasks(stage))
    }

    /// Position of a task within its stage
    pub fn position(&self, id: &TaskId) -> Option<(Stage, usize)> {
        let stage = self.tasks.get(id)?.stage;
        let index = self.order[stage.index()].iter().position(|o| o == id)?;
        Some((stage, index))
    }

    /// Adds a task to the end of its stage, assigning a fresh ID
    ///
    /// Fails only once every ID in the sequence has been issued.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let id = self.ids.issue().ok_or(StoreError::IdsExhausted)?;
        let task = Task::from_draft(id.clone(), draft, Utc::now());

        self.order[task.stage.index()].push(id.clone());
        self.tasks.insert(id.clone(), task.clone());

        debug!(id = %id, stage = %task.stage, "task added");
        self.notify(StoreEvent::Added(id));
        Ok(task)
    }

    /// Replaces a task record, keeping its position
    pub fn update(&mut self, task: Task) -> Result<(), StoreError> {
        let current = self
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;

        if current.stage != task.stage {
            return Err(StoreError::StageChange(task.id));
        }
        if current.created_at != task.created_at {
            return Err(StoreError::CreatedAtChange(task.id));
        }
        if *current == task {
            return Ok(());
        }

        let id = task.id.clone();
        *current = task;

        debug!(id = %id, "task updated");
        self.notify(StoreEvent::Updated(id));
        Ok(())
    }

    /// Removes a task and returns it
    pub fn remove(&mut self, id: &TaskId) -> Result<Task, StoreError> {
        let task = self
            .tasks
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        self.order[task.stage.index()].retain(|other| other != id);

        debug!(id = %id, "task removed");
        self.notify(StoreEvent::Removed(id.clone()));
        Ok(task)
    }

    /// Moves a task to the end of another stage
    ///
    /// Moving a task to the stage it is already in succeeds and changes nothing.
    pub fn move_to(&mut self, id: &TaskId, stage: Stage) -> Result<(), StoreError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let from = task.stage;
        if from == stage {
            return Ok(());
        }
        task.stage = stage;

        self.order[from.index()].retain(|other| other != id);
        self.order[stage.index()].push(id.clone());

        debug!(id = %id, from = %from, to = %stage, "task moved");
        self.notify(StoreEvent::Moved {
            id: id.clone(),
            from,
            to: stage,
        });
        Ok(())
    }

    /// Moves the task at `from` so it ends up at `to` within one stage
    ///
    /// Both positions index the unfiltered stage order. `to` is the final
    /// position, so `to == len - 1` lands at the end.
    pub fn reorder(&mut self, stage: Stage, from: usize, to: usize) -> Result<(), StoreError> {
        let order = &mut self.order[stage.index()];
        let len = order.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::OutOfRange { stage, index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let id = order.remove(from);
        order.insert(to, id);

        debug!(stage = %stage, from, to, "stage reordered");
        self.notify(StoreEvent::Reordered { stage, from, to });
        Ok(())
    }

    /// Merges a filter patch into the current criteria
    pub fn set_filters(&mut self, patch: FilterPatch) {
        let mut filters = self.filters.clone();
        filters.apply(patch);
        if filters == self.filters {
            return;
        }
        self.filters = filters;

        debug!(filters = %self.filters, "filters changed");
        self.notify(StoreEvent::FiltersChanged);
    }

    /// Registers an observer run after every committed change
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        // Observers only get a shared view, so they cannot add or remove
        // subscriptions while this runs.
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(&event, self);
        }
        self.observers = observers;
    }
}
