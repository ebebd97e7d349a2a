//! Board view, filter and config commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use super::workspace::{today, Workspace};
use crate::domain::{Category, Command, FilterCriteria, FilterPatch, Priority, Task, TaskStore};

#[derive(Subcommand)]
pub enum FilterCommands {
    /// Change filters; unspecified ones keep their value
    ///
    /// Use "any" to clear a category or priority filter.
    Set {
        /// Text to look for in titles and descriptions ("" clears)
        #[arg(long, short)]
        search: Option<String>,

        /// Category (work, personal, urgent, any)
        #[arg(long, short)]
        category: Option<String>,

        /// Priority (high, medium, low, any)
        #[arg(long, short)]
        priority: Option<String>,
    },

    /// Remove all filters
    Clear,

    /// Show the current filters
    Show,
}

/// Prints the board as filtered
pub fn show_board(workspace: &Workspace, output: &Output) -> Result<()> {
    let session = workspace.open(output)?;
    render_board(session.store(), today(), output);
    workspace.finish(session)
}

fn render_board(store: &TaskStore, today: NaiveDate, output: &Output) {
    let grouped = store.grouped_visible();

    if output.is_json() {
        let columns: Vec<_> = grouped
            .iter()
            .map(|(stage, tasks)| {
                serde_json::json!({
                    "stage": stage,
                    "label": stage.label(),
                    "tasks": tasks
                        .iter()
                        .map(|task| task_json(task, today))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();

        output.data(&serde_json::json!({
            "filters": store.filters(),
            "columns": columns,
            "shown": grouped.total(),
            "hidden": store.len() - grouped.total(),
        }));
        return;
    }

    if !store.filters().is_empty() {
        println!("Filters: {}", store.filters());
        println!();
    }

    for (stage, tasks) in grouped.iter() {
        println!("{} ({})", stage.label(), tasks.len());
        println!("{}", "-".repeat(60));
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for (position, task) in tasks.iter().enumerate() {
            println!("{:>3}. {}", position + 1, task_line(task, today));
        }
        println!();
    }

    let hidden = store.len() - grouped.total();
    if hidden > 0 {
        println!("{} task(s) hidden by filters", hidden);
    }
}

fn task_line(task: &Task, today: NaiveDate) -> String {
    let mut line = format!(
        "{:<8} {}  [{}, {}, due {}]",
        task.id, task.title, task.priority, task.category, task.due_date
    );
    if task.is_overdue(today) {
        line.push_str(" OVERDUE");
    }
    line
}

fn task_json(task: &Task, today: NaiveDate) -> serde_json::Value {
    let mut value = serde_json::json!(task);
    if let Some(object) = value.as_object_mut() {
        object.insert("overdue".to_string(), task.is_overdue(today).into());
    }
    value
}

pub fn run_filter(cmd: FilterCommands, workspace: &Workspace, output: &Output) -> Result<()> {
    let mut session = workspace.open(output)?;

    let patch = match cmd {
        FilterCommands::Set {
            search,
            category,
            priority,
        } => {
            let mut patch = FilterPatch::default();
            if let Some(search) = search {
                patch = patch.with_search(search);
            }
            if let Some(category) = category {
                patch = patch.with_category(parse_optional::<Category>(&category)?);
            }
            if let Some(priority) = priority {
                patch = patch.with_priority(parse_optional::<Priority>(&priority)?);
            }
            Some(patch)
        }
        FilterCommands::Clear => Some(FilterPatch::clear_all()),
        FilterCommands::Show => None,
    };

    if let Some(patch) = patch {
        session.apply(Command::SetFilters(patch))?;
    }

    let filters = session.store().filters();
    if output.is_json() {
        output.data(filters);
    } else {
        output.success(&format!("Filters: {}", filters));
    }

    workspace.finish(session)
}

/// Parses a label, treating "any", "all" and "" as no filter
fn parse_optional<T>(value: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value.trim().to_lowercase().as_str() {
        "" | "any" | "all" => Ok(None),
        _ => value
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid filter value: {}", value)),
    }
}

/// Prints the effective configuration and paths
pub fn show_config(workspace: &Workspace, output: &Output) -> Result<()> {
    let config_path = workspace
        .config_path
        .as_ref()
        .map(|p| p.display().to_string());

    if output.is_json() {
        output.data(&serde_json::json!({
            "config_path": config_path,
            "store_path": workspace.store_path.display().to_string(),
            "config": workspace.config,
        }));
        return Ok(());
    }

    println!(
        "Config file: {}",
        config_path.as_deref().unwrap_or("(none)")
    );
    println!("Board file: {}", workspace.store_path.display());
    println!();
    let content =
        toml::to_string_pretty(&workspace.config).context("Failed to serialize config")?;
    print!("{}", content);

    Ok(())
}
