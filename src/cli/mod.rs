//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Tasks | Create and change cards | `add`, `edit`, `show`, `rm`, `move`, `reorder` |
//! | Board | View the columns | `board` (`ls`), `tui` |
//! | Filters | Narrow the view | `filter set`, `filter clear`, `filter show` |
//! | Setup | Inspect settings | `config` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. Use `--verbose` (or `-v`)
//! for debug output, or set `TASKBOARD_LOG` to any filter directive:
//! ```bash
//! TASKBOARD_LOG=taskboard=trace board ls
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod board;
mod output;
mod task;
mod tui;
mod workspace;

pub use app::{run, Cli, Commands, LOG_ENV};
pub use output::{Output, OutputFormat};
pub use workspace::Workspace;
