//! Board session: a task store bound to a snapshot slot
//!
//! Opening a session loads the board (or starts a fresh one), and every
//! committed change is saved through the [`Persister`] by an observer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, Utc};
use tracing::{debug, warn};

use super::{Persister, SnapshotStore, StorageError};
use crate::domain::{
    BoardSnapshot, Command, Outcome, StoreError, SubscriptionId, TaskStore, SNAPSHOT_VERSION,
};

/// How a session starts and saves
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Seed an empty board with example tasks
    pub seed_examples: bool,
    /// Upper bound on how long a load or save may block
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seed_examples: true,
            timeout: Duration::from_secs(2),
        }
    }
}

type SaveError = Arc<Mutex<Option<StorageError>>>;

/// Open board with autosave
pub struct Session {
    store: TaskStore,
    persister: Arc<Persister>,
    save_error: SaveError,
    recovered: Option<StorageError>,
    set_aside_to: Option<String>,
    autosave: SubscriptionId,
    timeout: Duration,
}

impl Session {
    /// Opens the board held by `backend`
    ///
    /// Missing data starts the initial board. Unreadable data is set aside
    /// and also replaced by the initial board; the error is kept in
    /// [`Session::recovered`]. Only failures to reach the backend at all
    /// are returned.
    pub fn open(backend: Arc<dyn SnapshotStore>, options: SessionOptions) -> Result<Self, StorageError> {
        let persister = Arc::new(Persister::spawn(backend.clone(), options.timeout)?);
        let location = persister.location().to_string();

        let (mut store, recovered, fresh) = match persister.load() {
            Ok(Some(snapshot)) => match TaskStore::from_snapshot(warn_if_newer(snapshot)) {
                Ok(store) => (store, None, false),
                Err(e) => {
                    let err = StorageError::Inconsistent {
                        location: location.clone(),
                        reason: e.to_string(),
                    };
                    (initial_store(options)?, Some(err), true)
                }
            },
            Ok(None) => (initial_store(options)?, None, true),
            Err(e) if e.is_corrupt() => (initial_store(options)?, Some(e), true),
            Err(e) => return Err(e),
        };

        let mut set_aside_to = None;
        if let Some(err) = &recovered {
            match backend.set_aside() {
                Ok(Some(moved)) => {
                    warn!(error = %err, moved_to = %moved, "recovered from unreadable board");
                    set_aside_to = Some(moved);
                }
                Ok(None) => warn!(error = %err, "recovered from unreadable board"),
                Err(e) => {
                    // Saving now would overwrite data we could not move
                    warn!(error = %e, "could not set aside unreadable board");
                    return Err(e);
                }
            }
        }

        let save_error: SaveError = Arc::new(Mutex::new(None));
        let subscription = store.subscribe(autosave(persister.clone(), save_error.clone()));

        let mut session = Self {
            store,
            persister,
            save_error,
            recovered,
            set_aside_to,
            autosave: subscription,
            timeout: options.timeout,
        };

        if fresh {
            session.save_now();
        }

        debug!(location = %location, tasks = session.store.len(), "board opened");
        Ok(session)
    }

    /// Read access to the board
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Direct access to the board; changes are still autosaved
    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    /// Runs a command and saves the result
    pub fn apply(&mut self, command: Command) -> Result<Outcome, StoreError> {
        self.store.apply(command)
    }

    /// The error that forced a fresh board on open, if any
    pub fn recovered(&self) -> Option<&StorageError> {
        self.recovered.as_ref()
    }

    /// Where the unreadable board was moved on open, if it was
    pub fn set_aside_to(&self) -> Option<&str> {
        self.set_aside_to.as_deref()
    }

    /// Where the board is stored
    pub fn location(&self) -> &str {
        self.persister.location()
    }

    /// Returns true if the most recent save did not succeed
    pub fn has_unsaved_changes(&self) -> bool {
        self.save_error
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(true)
    }

    /// Saves again if the last save failed
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if !self.has_unsaved_changes() {
            return Ok(());
        }
        self.persister.save(self.store.snapshot())?;
        self.clear_save_error();
        Ok(())
    }

    /// Flushes and stops the background writer
    pub fn close(mut self) -> Result<(), StorageError> {
        self.store.unsubscribe(self.autosave);
        let flushed = self.flush();
        let closed = self.persister.close(self.timeout);
        flushed.and(closed)
    }

    fn save_now(&mut self) {
        match self.persister.save(self.store.snapshot()) {
            Ok(()) => self.clear_save_error(),
            Err(e) => {
                warn!(error = %e, "failed to save board");
                if let Ok(mut slot) = self.save_error.lock() {
                    *slot = Some(e);
                }
            }
        }
    }

    fn clear_save_error(&self) {
        if let Ok(mut slot) = self.save_error.lock() {
            *slot = None;
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("location", &self.persister.location())
            .field("store", &self.store)
            .field("recovered", &self.recovered)
            .finish_non_exhaustive()
    }
}

fn warn_if_newer(snapshot: BoardSnapshot) -> BoardSnapshot {
    if snapshot.is_newer_format() {
        warn!(
            version = snapshot.version,
            supported = SNAPSHOT_VERSION,
            "board was written by a newer version; unknown data will be dropped on save"
        );
    }
    snapshot
}

fn initial_store(options: SessionOptions) -> Result<TaskStore, StorageError> {
    let snapshot = if options.seed_examples {
        BoardSnapshot::seeded(Local::now().date_naive(), Utc::now())
    } else {
        BoardSnapshot::default()
    };
    TaskStore::from_snapshot(snapshot).map_err(|e| StorageError::Inconsistent {
        location: "initial board".to_string(),
        reason: e.to_string(),
    })
}

fn autosave(persister: Arc<Persister>, save_error: SaveError) -> crate::domain::Observer {
    Box::new(move |event, store| {
        let result = persister.save(store.snapshot());
        if let Err(e) = &result {
            warn!(error = %e, ?event, "failed to save board");
        }
        if let Ok(mut slot) = save_error.lock() {
            *slot = result.err();
        }
    })
}
