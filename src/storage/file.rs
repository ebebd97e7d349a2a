//! JSON file storage for the board snapshot
//!
//! The snapshot lives in a single file. Reads take a shared lock, writes go
//! to a locked temp file that is renamed over the original.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::{SnapshotStore, StorageError};
use crate::domain::BoardSnapshot;

/// Snapshot slot backed by one JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    /// Where the next unreadable snapshot will be moved
    ///
    /// Earlier copies are kept: `board.json.corrupt`, then
    /// `board.json.corrupt.1`, `board.json.corrupt.2` and so on.
    fn corrupt_path(&self) -> PathBuf {
        let first = sibling(&self.path, "corrupt");
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| sibling(&first, &n.to_string()))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }
}

/// `board.json` -> `board.json.{suffix}`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl SnapshotStore for FileStore {
    fn read(&self) -> Result<Option<BoardSnapshot>, StorageError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        FileExt::lock_shared(&file).map_err(|e| StorageError::io(&self.path, e))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| StorageError::io(&self.path, e))?;

        // Lock is released when file is dropped
        BoardSnapshot::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                location: self.location(),
                source,
            })
    }

    fn write(&self, snapshot: &BoardSnapshot) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let json = snapshot.to_json().map_err(|source| StorageError::Corrupt {
            location: self.location(),
            source,
        })?;

        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StorageError::io(&temp_path, e))?;

            FileExt::lock_exclusive(&file).map_err(|e| StorageError::io(&temp_path, e))?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(json.as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
                .and_then(|()| writer.flush())
                .map_err(|e| StorageError::io(&temp_path, e))?;
            drop(writer);

            file.sync_all().map_err(|e| StorageError::io(&temp_path, e))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn set_aside(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.corrupt_path();
        fs::rename(&self.path, &target).map_err(|e| StorageError::io(&self.path, e))?;
        Ok(Some(target.display().to_string()))
    }
}
