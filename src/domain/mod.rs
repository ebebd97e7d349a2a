//! Domain models for the task board
//!
//! Contains the core board logic without any I/O concerns.

mod command;
mod filter;
mod id;
mod projector;
mod snapshot;
mod store;
mod task;

pub use command::{Command, Outcome};
pub use filter::{visible_tasks, FilterCriteria, FilterPatch};
pub use id::{IdError, IdSequence, TaskId};
pub use projector::{group_visible, translate_visible_move, GroupedTasks};
pub use snapshot::{BoardSnapshot, SNAPSHOT_VERSION};
pub use store::{Observer, StoreError, StoreEvent, SubscriptionId, TaskStore};
pub use task::{Category, LabelError, Priority, Stage, Task, TaskDraft};
