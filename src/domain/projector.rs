//! Board projection: visible tasks grouped by stage
//!
//! The store owns the manual order of each stage. A projection only narrows
//! that order down to the tasks passing the filters; it never sorts by any
//! task field.
//!
//! Positions seen in a filtered column differ from positions in the stage
//! order whenever a filter hides tasks. [`TaskStore::reorder`] takes stage
//! positions; [`TaskStore::reorder_visible`] takes column positions and
//! translates them first.

use super::filter::{FilterCriteria, Matcher};
use super::store::{StoreError, TaskStore};
use super::task::{Stage, Task};

/// Visible tasks of a board, one column per stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTasks<'a> {
    columns: [Vec<&'a Task>; 3],
}

impl<'a> GroupedTasks<'a> {
    /// Visible tasks of one stage in manual order
    pub fn stage(&self, stage: Stage) -> &[&'a Task] {
        &self.columns[stage.index()]
    }

    /// Columns in board order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &[&'a Task])> {
        Stage::ALL
            .into_iter()
            .map(move |stage| (stage, self.stage(stage)))
    }

    /// Total number of visible tasks
    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Groups the tasks of `store` passing `criteria` by stage
pub fn group_visible<'a>(store: &'a TaskStore, criteria: &FilterCriteria) -> GroupedTasks<'a> {
    let matcher = Matcher::new(criteria);
    let mut grouped = GroupedTasks::default();
    for stage in Stage::ALL {
        grouped.columns[stage.index()] = store
            .stage_tasks(stage)
            .filter(|t| matcher.matches(t))
            .collect();
    }
    grouped
}

/// Stage positions of the tasks visible under `criteria`
fn visible_positions(store: &TaskStore, stage: Stage, criteria: &FilterCriteria) -> Vec<usize> {
    let matcher = Matcher::new(criteria);
    store
        .stage_tasks(stage)
        .enumerate()
        .filter(|(_, t)| matcher.matches(t))
        .map(|(index, _)| index)
        .collect()
}

/// Translates a drag within a filtered column into stage positions
///
/// The dragged task keeps its identity; the destination is the stage
/// position of the task currently shown at `to`. Dragging down lands just
/// after that task, dragging up lands just before it.
pub fn translate_visible_move(
    store: &TaskStore,
    stage: Stage,
    criteria: &FilterCriteria,
    from: usize,
    to: usize,
) -> Result<(usize, usize), StoreError> {
    let positions = visible_positions(store, stage, criteria);
    let len = positions.len();
    let lookup = |index: usize| {
        positions
            .get(index)
            .copied()
            .ok_or(StoreError::OutOfRange { stage, index, len })
    };

    // With list-move semantics the target's own stage position is exactly
    // the slot that puts the dragged task on the correct side of it.
    Ok((lookup(from)?, lookup(to)?))
}

impl TaskStore {
    /// Visible tasks grouped by stage under the current filters
    pub fn grouped_visible(&self) -> GroupedTasks<'_> {
        group_visible(self, self.filters())
    }

    /// Visible tasks under the current filters, stage by stage
    pub fn visible_tasks(&self) -> Vec<&Task> {
        super::filter::visible_tasks(self.tasks_in_order(), self.filters())
    }

    /// Reorders a stage using positions in its filtered column
    pub fn reorder_visible(&mut self, stage: Stage, from: usize, to: usize) -> Result<(), StoreError> {
        let criteria = self.filters().clone();
        let (from, to) = translate_visible_move(self, stage, &criteria, from, to)?;
        self.reorder(stage, from, to)
    }
}
