//! Task CLI commands

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use super::workspace::{today, Workspace};
use crate::domain::{
    Category, Command, Outcome, Priority, Stage, StoreError, Task, TaskDraft, TaskId, TaskStore,
};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   board add "Fix login bug"
    ///   board add "Release notes" --stage in-progress --priority high --due 2025-03-01
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Stage to start in (todo, in-progress, done)
        #[arg(long, short, default_value = "pending")]
        stage: Stage,

        /// Category (work, personal, urgent)
        #[arg(long, short, default_value = "work")]
        category: Category,

        /// Priority (high, medium, low)
        #[arg(long, short, default_value = "medium")]
        priority: Priority,

        /// Due date (YYYY-MM-DD); defaults to a week from today
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Edit task fields (use `move` to change stage)
    Edit {
        /// Task ID
        id: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short)]
        description: Option<String>,

        #[arg(long, short)]
        category: Option<Category>,

        #[arg(long, short)]
        priority: Option<Priority>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: TaskId,
    },

    /// Delete a task
    #[command(visible_alias = "delete")]
    Rm {
        /// Task ID
        id: TaskId,
    },

    /// Move a task to another stage (appended at the end)
    Move {
        /// Task ID
        id: TaskId,

        /// Target stage (todo, in-progress, done)
        stage: Stage,
    },

    /// Change a task's position within its stage
    ///
    /// Positions are 1-based as listed by `board`. Unless --absolute is
    /// given they refer to the column as currently filtered.
    Reorder {
        /// Stage whose column to reorder
        stage: Stage,

        /// Current position of the task
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        from: u64,

        /// Position to move it to
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        to: u64,

        /// Use positions in the unfiltered column
        #[arg(long)]
        absolute: bool,
    },
}

pub fn run(cmd: TaskCommands, workspace: &Workspace, output: &Output) -> Result<()> {
    let mut session = workspace.open(output)?;

    match cmd {
        TaskCommands::Add {
            title,
            description,
            stage,
            category,
            priority,
            due,
        } => {
            let draft = TaskDraft::new(
                require_title(&title)?,
                due.unwrap_or_else(|| workspace.default_due()),
            )
            .with_description(description.unwrap_or_default())
            .in_stage(stage)
            .with_category(category)
            .with_priority(priority);

            let task = match session.apply(Command::AddTask(draft))? {
                Outcome::Added(task) => task,
                other => bail!("Unexpected result from add: {:?}", other),
            };

            if output.is_json() {
                output.data(&task);
            } else {
                output.success(&format!("Created task: {} - {}", task.id, task.title));
            }
        }

        TaskCommands::Edit {
            id,
            title,
            description,
            category,
            priority,
            due,
        } => {
            let mut task = find(session.store(), &id)?.clone();
            if let Some(title) = title {
                task.set_title(require_title(&title)?);
            }
            if let Some(description) = description {
                task.set_description(description);
            }
            if let Some(category) = category {
                task.category = category;
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(due) = due {
                task.due_date = due;
            }

            session.apply(Command::UpdateTask(task.clone()))?;

            if output.is_json() {
                output.data(&task);
            } else {
                output.success(&format!("Updated task: {}", task.id));
            }
        }

        TaskCommands::Show { id } => {
            show_task(session.store(), &id, output)?;
        }

        TaskCommands::Rm { id } => {
            let task = match session.apply(Command::DeleteTask(id))? {
                Outcome::Removed(task) => task,
                other => bail!("Unexpected result from delete: {:?}", other),
            };

            if output.is_json() {
                output.data(&serde_json::json!({
                    "deleted": task.id,
                    "title": task.title,
                }));
            } else {
                output.success(&format!("Deleted task: {} - {}", task.id, task.title));
            }
        }

        TaskCommands::Move { id, stage } => {
            let from = find(session.store(), &id)?.stage;
            session.apply(Command::MoveTask {
                id: id.clone(),
                stage,
            })?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "id": id,
                    "from": from,
                    "stage": stage,
                }));
            } else if from == stage {
                output.success(&format!("{} is already in {}", id, stage.label()));
            } else {
                output.success(&format!(
                    "Moved {}: {} -> {}",
                    id,
                    from.label(),
                    stage.label()
                ));
            }
        }

        TaskCommands::Reorder {
            stage,
            from,
            to,
            absolute,
        } => {
            let (from_index, to_index) = (index(from), index(to));
            let command = if absolute {
                Command::ReorderTask {
                    stage,
                    from: from_index,
                    to: to_index,
                }
            } else {
                Command::ReorderVisible {
                    stage,
                    from: from_index,
                    to: to_index,
                }
            };

            session.apply(command).map_err(one_based)?;

            if output.is_json() {
                output.data(&serde_json::json!({
                    "stage": stage,
                    "order": session.store().stage_order(stage),
                }));
            } else {
                output.success(&format!(
                    "Moved position {} to {} in {}",
                    from,
                    to,
                    stage.label()
                ));
            }
        }
    }

    workspace.finish(session)
}

fn show_task(store: &TaskStore, id: &TaskId, output: &Output) -> Result<()> {
    let task = find(store, id)?;
    let overdue = task.is_overdue(today());
    let position = store.position(id).map(|(_, index)| index + 1);

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "overdue": overdue,
            "position": position,
        }));
        return Ok(());
    }

    println!("Task: {}", task.id);
    println!("Title: {}", task.title);
    println!("Stage: {}", task.stage.label());
    println!("Category: {}", task.category);
    println!("Priority: {}", task.priority);
    if overdue {
        println!("Due: {} (overdue)", task.due_date);
    } else {
        println!("Due: {}", task.due_date);
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(position) = position {
        println!(
            "Position: {} of {} in {}",
            position,
            store.stage_order(task.stage).len(),
            task.stage.label()
        );
    }

    if !task.description.is_empty() {
        println!("\nDescription:");
        println!("{}", task.description);
    }

    Ok(())
}

fn find<'a>(store: &'a TaskStore, id: &TaskId) -> Result<&'a Task> {
    store
        .get(id)
        .ok_or_else(|| StoreError::NotFound(id.clone()).into())
}

fn require_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        bail!("Task title cannot be empty");
    }
    Ok(title)
}

/// 1-based position to index; clap has already rejected zero
fn index(position: u64) -> usize {
    usize::try_from(position.saturating_sub(1)).unwrap_or(usize::MAX)
}

/// Reports range errors with the positions the user typed
fn one_based(err: StoreError) -> anyhow::Error {
    match err {
        StoreError::OutOfRange { stage, index, len } => anyhow::anyhow!(
            "Position {} is out of range for {} ({} tasks shown)",
            index.saturating_add(1),
            stage.label(),
            len
        ),
        other => other.into(),
    }
}
