//! Resolved configuration and board location for one invocation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};

use super::output::Output;
use crate::storage::{Config, FileStore, Session, SessionOptions};

/// Where the board lives and how it behaves
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub store_path: PathBuf,
}

impl Workspace {
    /// Loads configuration and resolves the snapshot path
    pub fn resolve(store: Option<&Path>, config: Option<&Path>) -> Result<Self> {
        let config_path = config
            .map(Path::to_path_buf)
            .or_else(Config::default_config_path);
        let loaded = Config::load(config_path.as_deref())?;
        let store_path = loaded.snapshot_path(store)?;

        Ok(Self {
            config: loaded,
            config_path,
            store_path,
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            seed_examples: self.config.seed_examples,
            timeout: self.config.save_timeout(),
        }
    }

    /// Opens the board, reporting any recovery from unreadable data
    pub fn open(&self, output: &Output) -> Result<Session> {
        let backend = FileStore::new(&self.store_path);

        let session = Session::open(Arc::new(backend), self.session_options())
            .with_context(|| format!("Failed to open board: {}", self.store_path.display()))?;

        if let Some(err) = session.recovered() {
            if let Some(moved) = session.set_aside_to() {
                output.warn(&format!(
                    "{}. The old file was moved to {} and a fresh board was started.",
                    err, moved
                ));
            } else {
                output.warn(&format!("{}. A fresh board was started.", err));
            }
        }

        Ok(session)
    }

    /// Closes the board, making sure the last change reached disk
    pub fn finish(&self, session: Session) -> Result<()> {
        session
            .close()
            .with_context(|| format!("Failed to save board: {}", self.store_path.display()))
    }

    /// Due date for tasks added without one
    pub fn default_due(&self) -> NaiveDate {
        let today = today();
        today
            .checked_add_days(Days::new(u64::from(self.config.default_due_days)))
            .unwrap_or(today)
    }
}

/// The local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
