//! TUI application state and logic

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::event::{Event, EventHandler};
use super::kanban;
use super::ui::Terminal;
use crate::domain::{
    Category, Command, FilterCriteria, FilterPatch, Priority, Stage, Task, TaskDraft, TaskId,
};
use crate::storage::Session;

const HELP: &str =
    "h/l column  j/k select  H/L move  J/K reorder  / search  c/p filter  x clear  a add  d delete  q quit";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Live search; `original` is restored on Esc
    Search { query: String, original: String },
    Confirm(ConfirmAction),
    NewTask(String),
}

/// Confirmation actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(TaskId),
}

/// Application state
pub struct App {
    session: Session,

    /// Column with keyboard focus
    focus: Stage,

    /// Selected row in each column, as filtered
    selected: [usize; 3],

    input_mode: InputMode,

    status_message: Option<String>,

    should_quit: bool,

    today: NaiveDate,

    /// Due date for tasks created here
    default_due: NaiveDate,
}

impl App {
    pub fn new(session: Session, today: NaiveDate, default_due: NaiveDate) -> Self {
        Self {
            session,
            focus: Stage::Pending,
            selected: [0; 3],
            input_mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
            today,
            default_due,
        }
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(_, _) | Event::Tick => {}
            }
        }

        Ok(())
    }

    /// Gives the session back once the loop is done
    pub fn into_session(self) -> Session {
        self.session
    }

    fn draw(&self, frame: &mut Frame) {
        kanban::draw(frame, self);
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match &self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search { .. } => self.handle_search_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
            InputMode::NewTask(_) => self.handle_new_task_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(stage) = self.focus.prev() {
                    self.focus = stage;
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(stage) = self.focus.next() {
                    self.focus = stage;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.select_offset(1),
            KeyCode::Char('k') | KeyCode::Up => self.select_offset(-1),

            KeyCode::Char('H') => self.move_selected(self.focus.prev()),
            KeyCode::Char('L') => self.move_selected(self.focus.next()),
            KeyCode::Char('J') => self.reorder_selected(1),
            KeyCode::Char('K') => self.reorder_selected(-1),

            KeyCode::Char('/') => {
                let current = self.filters().search.clone();
                self.input_mode = InputMode::Search {
                    query: current.clone(),
                    original: current,
                };
            }
            KeyCode::Char('c') => {
                let next = cycle(self.filters().category, &Category::ALL);
                self.apply(Command::SetFilters(
                    FilterPatch::default().with_category(next),
                ));
            }
            KeyCode::Char('p') => {
                let next = cycle(self.filters().priority, &Priority::ALL);
                self.apply(Command::SetFilters(
                    FilterPatch::default().with_priority(next),
                ));
            }
            KeyCode::Char('x') => {
                self.apply(Command::SetFilters(FilterPatch::clear_all()));
            }

            KeyCode::Char('a') => self.input_mode = InputMode::NewTask(String::new()),
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.input_mode = InputMode::Confirm(ConfirmAction::DeleteTask(task.id.clone()));
                }
            }

            KeyCode::Char('?') => self.status_message = Some(HELP.to_string()),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let InputMode::Search { query, original } = &self.input_mode else {
            return;
        };
        let (mut query, original) = (query.clone(), original.clone());

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.apply(Command::SetFilters(FilterPatch::default().with_search(original)));
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                query.pop();
                self.search_for(query, original);
            }
            KeyCode::Char(c) => {
                query.push(c);
                self.search_for(query, original);
            }
            _ => {}
        }
    }

    fn search_for(&mut self, query: String, original: String) {
        self.apply(Command::SetFilters(
            FilterPatch::default().with_search(query.clone()),
        ));
        self.input_mode = InputMode::Search { query, original };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let InputMode::Confirm(ConfirmAction::DeleteTask(id)) =
                    std::mem::take(&mut self.input_mode)
                {
                    if self.apply(Command::DeleteTask(id.clone())) {
                        self.status_message = Some(format!("Deleted {}", id));
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) {
        let InputMode::NewTask(title) = &self.input_mode else {
            return;
        };
        let mut title = title.clone();

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let title = title.trim();
                if !title.is_empty() {
                    let draft = TaskDraft::new(title, self.default_due).in_stage(self.focus);
                    if self.apply(Command::AddTask(draft)) {
                        self.select_last(self.focus);
                    }
                }
            }
            KeyCode::Backspace => {
                title.pop();
                self.input_mode = InputMode::NewTask(title);
            }
            KeyCode::Char(c) => {
                title.push(c);
                self.input_mode = InputMode::NewTask(title);
            }
            _ => {}
        }
    }

    /// Runs a command and reports failures in the status bar
    ///
    /// Returns true if the command was applied.
    fn apply(&mut self, command: Command) -> bool {
        let name = command.name();
        let applied = match self.session.apply(command) {
            Ok(_) => true,
            Err(e) => {
                self.status_message = Some(format!("Cannot {}: {}", name, e));
                false
            }
        };

        if applied && self.session.has_unsaved_changes() {
            self.status_message = Some("Changes not saved yet; will retry".to_string());
        }
        self.clamp_selection();
        applied
    }

    fn select_offset(&mut self, delta: isize) {
        let len = self.column(self.focus).len();
        if len == 0 {
            return;
        }
        let current = self.selected[self.focus.index()];
        self.selected[self.focus.index()] = current.saturating_add_signed(delta).min(len - 1);
    }

    fn select_last(&mut self, stage: Stage) {
        let len = self.column(stage).len();
        self.selected[stage.index()] = len.saturating_sub(1);
    }

    fn move_selected(&mut self, target: Option<Stage>) {
        let (Some(target), Some(task)) = (target, self.selected_task()) else {
            return;
        };
        let id = task.id.clone();

        if self.apply(Command::MoveTask { id, stage: target }) {
            // Moved tasks land at the end of the target column
            self.focus = target;
            self.select_last(target);
        }
    }

    fn reorder_selected(&mut self, delta: isize) {
        let from = self.selected[self.focus.index()];
        let len = self.column(self.focus).len();
        let Some(to) = from.checked_add_signed(delta).filter(|to| *to < len) else {
            return;
        };

        let command = Command::ReorderVisible {
            stage: self.focus,
            from,
            to,
        };
        if self.apply(command) {
            self.selected[self.focus.index()] = to;
        }
    }

    fn clamp_selection(&mut self) {
        for stage in Stage::ALL {
            let len = self.column(stage).len();
            let selected = &mut self.selected[stage.index()];
            *selected = (*selected).min(len.saturating_sub(1));
        }
    }

    /// Visible tasks of a column in board order
    pub fn column(&self, stage: Stage) -> Vec<&Task> {
        self.session.store().grouped_visible().stage(stage).to_vec()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.column(self.focus)
            .get(self.selected[self.focus.index()])
            .copied()
    }

    pub fn selected_index(&self, stage: Stage) -> usize {
        self.selected[stage.index()]
    }

    pub fn focus(&self) -> Stage {
        self.focus
    }

    pub fn filters(&self) -> &FilterCriteria {
        self.session.store().filters()
    }

    pub fn hidden_count(&self) -> usize {
        let shown: usize = Stage::ALL.iter().map(|s| self.column(*s).len()).sum();
        self.session.store().len() - shown
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// None -> first -> ... -> last -> None
fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SessionOptions};
    use std::sync::Arc;
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn key(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    /// App over an empty board holding "A", "B", "C" in To Do
    fn app_with_abc() -> App {
        let options = SessionOptions {
            seed_examples: false,
            timeout: Duration::from_secs(5),
        };
        let mut session = Session::open(Arc::new(MemoryStore::new()), options).unwrap();
        for title in ["A", "B", "C"] {
            session
                .apply(Command::AddTask(TaskDraft::new(title, day())))
                .unwrap();
        }
        App::new(session, day(), day())
    }

    fn titles(app: &App, stage: Stage) -> Vec<String> {
        app.column(stage).iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn input_mode_default_is_normal() {
        assert_eq!(InputMode::default(), InputMode::Normal);
    }

    #[test]
    fn cycle_wraps_through_none() {
        assert_eq!(cycle(None, &Priority::ALL), Some(Priority::High));
        assert_eq!(cycle(Some(Priority::High), &Priority::ALL), Some(Priority::Medium));
        assert_eq!(cycle(Some(Priority::Low), &Priority::ALL), None);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app_with_abc();
        press(&mut app, "jjjjj");
        assert_eq!(app.selected_task().unwrap().title, "C");
        press(&mut app, "kkkkk");
        assert_eq!(app.selected_task().unwrap().title, "A");
    }

    #[test]
    fn move_right_follows_the_task() {
        let mut app = app_with_abc();
        press(&mut app, "jL");

        assert_eq!(app.focus(), Stage::Active);
        assert_eq!(titles(&app, Stage::Active), vec!["B"]);
        assert_eq!(titles(&app, Stage::Pending), vec!["A", "C"]);
        assert_eq!(app.selected_task().unwrap().title, "B");

        // Nothing left of To Do
        press(&mut app, "hH");
        assert_eq!(app.focus(), Stage::Pending);
    }

    #[test]
    fn reorder_down_and_up() {
        let mut app = app_with_abc();
        press(&mut app, "J");
        assert_eq!(titles(&app, Stage::Pending), vec!["B", "A", "C"]);
        assert_eq!(app.selected_task().unwrap().title, "A");

        press(&mut app, "jK");
        assert_eq!(titles(&app, Stage::Pending), vec!["B", "C", "A"]);
        assert_eq!(app.selected_task().unwrap().title, "C");

        press(&mut app, "K");
        assert_eq!(titles(&app, Stage::Pending), vec!["C", "B", "A"]);

        // Already at the top
        press(&mut app, "K");
        assert_eq!(titles(&app, Stage::Pending), vec!["C", "B", "A"]);
        assert_eq!(app.selected_index(Stage::Pending), 0);
    }

    #[test]
    fn search_filters_live_and_esc_restores() {
        let mut app = app_with_abc();
        press(&mut app, "/b");
        assert_eq!(titles(&app, Stage::Pending), vec!["B"]);

        key(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode(), &InputMode::Normal);
        assert_eq!(titles(&app, Stage::Pending), vec!["A", "B", "C"]);

        press(&mut app, "/c");
        key(&mut app, KeyCode::Enter);
        assert_eq!(app.filters().search, "c");
        assert_eq!(app.hidden_count(), 2);

        press(&mut app, "x");
        assert!(app.filters().is_empty());
    }

    #[test]
    fn category_filter_cycles() {
        let mut app = app_with_abc();
        press(&mut app, "c");
        assert_eq!(app.filters().category, Some(Category::Work));
        press(&mut app, "ccc");
        assert_eq!(app.filters().category, None);
    }

    #[test]
    fn add_task_to_focused_column() {
        let mut app = app_with_abc();
        press(&mut app, "la");
        press(&mut app, "New card");
        key(&mut app, KeyCode::Enter);

        assert_eq!(titles(&app, Stage::Active), vec!["New card"]);
        assert_eq!(app.selected_task().unwrap().title, "New card");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with_abc();
        press(&mut app, "dn");
        assert_eq!(titles(&app, Stage::Pending).len(), 3);

        press(&mut app, "jjdy");
        assert_eq!(titles(&app, Stage::Pending), vec!["A", "B"]);
        assert_eq!(app.selected_task().unwrap().title, "B");
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with_abc();
        press(&mut app, "q");
        assert!(app.should_quit());

        let mut app = app_with_abc();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn changes_reach_the_session() {
        let mut app = app_with_abc();
        press(&mut app, "L");
        let session = app.into_session();
        assert_eq!(session.store().stage_order(Stage::Active).len(), 1);
        session.close().unwrap();
    }
}
