//! # Storage Layer
//!
//! Persistence for the board: one snapshot in one named slot.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Board snapshot | Pretty JSON | `{data dir}/board.json` (or `--store`) |
//! | Config | TOML | `{config dir}/config.toml` (or `--config`) |
//!
//! ## Failure Handling
//!
//! - A missing snapshot is not an error: the board starts from its initial state
//! - An unreadable snapshot is set aside and replaced by the initial state
//! - Reads and writes run on one background writer with a timeout; a failed
//!   or late save never rolls back the in-memory board
//!
//! ## Key Types
//!
//! - [`SnapshotStore`] - A durable slot holding one [`BoardSnapshot`]
//! - [`FileStore`] - JSON file slot with locking and atomic replace
//! - [`MemoryStore`] - In-process slot
//! - [`Persister`] - Single-writer worker with timeouts
//! - [`Session`] - Store plus autosave, the entry point for front ends
//! - [`Config`] - User configuration

mod config;
mod file;
mod memory;
mod persister;
mod session;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::BoardSnapshot;

pub use config::{Config, ConfigError, MAX_DUE_DAYS, SNAPSHOT_FILE};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use persister::Persister;
pub use session::{Session, SessionOptions};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {location} is unreadable: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot at {location} is inconsistent: {reason}")]
    Inconsistent { location: String, reason: String },

    #[error("Storage did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Storage worker has stopped")]
    WorkerStopped,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the stored data exists but cannot be used
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. } | Self::Inconsistent { .. })
    }
}

/// A durable slot holding one board snapshot
pub trait SnapshotStore: Send + Sync {
    /// Reads the snapshot, or `None` if nothing has been written yet
    fn read(&self) -> Result<Option<BoardSnapshot>, StorageError>;

    /// Replaces the stored snapshot
    fn write(&self, snapshot: &BoardSnapshot) -> Result<(), StorageError>;

    /// Human-readable location for messages
    fn location(&self) -> String;

    /// Moves unreadable data out of the way so the next write cannot destroy it
    ///
    /// Returns where the data went, if anywhere.
    fn set_aside(&self) -> Result<Option<String>, StorageError> {
        Ok(None)
    }
}
