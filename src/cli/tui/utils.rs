//! Shared helpers for drawing cards

use chrono::NaiveDate;
use ratatui::style::Color;

use crate::domain::{Priority, Stage, Task};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated)
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub fn stage_color(stage: Stage) -> Color {
    match stage {
        Stage::Pending => Color::Cyan,
        Stage::Active => Color::Yellow,
        Stage::Complete => Color::DarkGray,
    }
}

/// Second line of a card: priority, category and due date
pub fn card_details(task: &Task, today: NaiveDate) -> String {
    let due = if task.is_overdue(today) {
        format!("overdue {}", task.due_date.format("%b %d"))
    } else {
        format!("due {}", task.due_date.format("%b %d"))
    };
    format!("{} · {} · {}", task.priority, task.category, due)
}
