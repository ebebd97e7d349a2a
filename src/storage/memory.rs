//! In-process snapshot slot
//!
//! Holds the serialized JSON rather than the snapshot itself, so it goes
//! through the same encoding as the file store.

use std::sync::Mutex;

use super::{SnapshotStore, StorageError};
use crate::domain::BoardSnapshot;

/// Snapshot slot kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds raw text
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(text.into())),
        }
    }

    /// Returns the raw text in the slot
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<BoardSnapshot>, StorageError> {
        let slot = self.slot.lock().map_err(|_| StorageError::WorkerStopped)?;
        slot.as_deref()
            .map(BoardSnapshot::from_json)
            .transpose()
            .map_err(|source| StorageError::Corrupt {
                location: self.location(),
                source,
            })
    }

    fn write(&self, snapshot: &BoardSnapshot) -> Result<(), StorageError> {
        let json = snapshot.to_json().map_err(|source| StorageError::Corrupt {
            location: self.location(),
            source,
        })?;
        let mut slot = self.slot.lock().map_err(|_| StorageError::WorkerStopped)?;
        *slot = Some(json);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn set_aside(&self) -> Result<Option<String>, StorageError> {
        let mut slot = self.slot.lock().map_err(|_| StorageError::WorkerStopped)?;
        Ok(slot.take().map(|_| "discarded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn empty_slot_reads_none() {
        assert!(MemoryStore::new().read().unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let store = MemoryStore::new();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let snapshot = BoardSnapshot::seeded(today, Utc::now());

        store.write(&snapshot).unwrap();

        assert_eq!(store.read().unwrap(), Some(snapshot));
        assert!(store.contents().unwrap().contains("\"next_id\": 4"));
    }

    #[test]
    fn garbage_is_corrupt() {
        let store = MemoryStore::with_contents("<<<");
        assert!(store.read().unwrap_err().is_corrupt());

        assert_eq!(store.set_aside().unwrap(), Some("discarded".to_string()));
        assert!(store.read().unwrap().is_none());
    }
}
