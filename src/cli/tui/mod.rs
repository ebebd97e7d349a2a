//! Interactive kanban board
//!
//! A terminal interface over the same session the CLI commands use. Every
//! key that changes the board is turned into a [`Command`](crate::domain::Command)
//! and saved like any other change.

mod app;
mod event;
mod kanban;
mod ui;
mod utils;

use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};

use super::output::Output;
use super::workspace::{today, Workspace};
use app::App;
use event::EventHandler;

/// Launch the TUI
pub fn run(workspace: &Workspace, output: &Output) -> Result<()> {
    // Open before taking over the terminal so warnings stay readable
    let session = workspace.open(output)?;
    let mut app = App::new(session, today(), workspace.default_due());

    let mut terminal = ui::init_terminal()?;
    let event_handler = EventHandler::new(250);

    // Restore the terminal even if the app panics
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        app.run(&mut terminal, event_handler)
    }));

    let restore_result = ui::restore_terminal();

    let loop_result = match result {
        Ok(inner_result) => {
            restore_result?;
            inner_result
        }
        Err(panic_payload) => {
            let _ = restore_result;
            if let Some(s) = panic_payload.downcast_ref::<&str>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else {
                Err(anyhow!("TUI panicked with unknown error"))
            }
        }
    };

    // Save whatever was changed before reporting a loop failure
    let finished = workspace.finish(app.into_session());
    loop_result.and(finished)
}
