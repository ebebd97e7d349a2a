//! Kanban view: one column per stage in manual order

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::app::{App, ConfirmAction, InputMode};
use super::utils::{card_details, priority_color, stage_color, truncate_str};
use crate::domain::{Stage, Task};

/// Draw the board
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Columns
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(main_chunks[0]);

    for (stage, column_area) in Stage::ALL.into_iter().zip(columns.iter()) {
        draw_column(frame, app, stage, *column_area);
    }

    draw_status_bar(frame, app, main_chunks[1]);
}

fn draw_column(frame: &mut Frame, app: &App, stage: Stage, area: Rect) {
    let tasks = app.column(stage);
    let focused = app.focus() == stage;
    let width = usize::from(area.width.saturating_sub(4));

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| card(task, app, width))
        .collect();

    let border_style = if focused {
        Style::default()
            .fg(stage_color(stage))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(stage_color(stage))
    };

    let title = format!("{} ({})", stage.label(), tasks.len());
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if focused && !tasks.is_empty() {
        state.select(Some(app.selected_index(stage)));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn card<'a>(task: &Task, app: &App, width: usize) -> ListItem<'a> {
    let title = Line::from(vec![
        Span::styled(
            format!("{} ", task.id),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(truncate_str(&task.title, width.saturating_sub(task.id.as_str().len() + 1))),
    ]);

    let details_style = if task.is_overdue(app.today()) {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(priority_color(task.priority))
    };
    let details = Line::styled(
        truncate_str(&card_details(task, app.today()), width),
        details_style,
    );

    ListItem::new(vec![title, details])
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = match app.input_mode() {
        InputMode::Normal => {
            let msg = app
                .status_message()
                .map(str::to_string)
                .unwrap_or_else(|| "[?]help [a]dd [d]elete [/]search [q]uit".to_string());
            (msg, Style::default())
        }
        InputMode::Search { query, .. } => (
            format!("Search: {}_", query),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::NewTask(title) => (
            format!("New task in {}: {}_", app.focus().label(), title),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::Confirm(ConfirmAction::DeleteTask(id)) => (
            format!("Delete {}? [y/n]", id),
            Style::default().fg(Color::Red),
        ),
    };

    let mut title = format!("Filters: {}", app.filters());
    let hidden = app.hidden_count();
    if hidden > 0 {
        title.push_str(&format!(" ({} hidden)", hidden));
    }

    let paragraph = Paragraph::new(content)
        .style(style)
        .block(Block::default().title(title).borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
