//! Taskboard - a local single-user kanban board
//!
//! Tasks move through three stages (to do, in progress, done) and keep a
//! manual order inside each stage. The board can be filtered by text,
//! category and priority, and is saved to a local JSON snapshot after
//! every change.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Category, Command, FilterCriteria, Priority, Stage, Task, TaskId, TaskStore};
pub use storage::{Session, SessionOptions};
