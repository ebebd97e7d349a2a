//! Background snapshot writer
//!
//! All reads and writes for one slot run in order on a single worker
//! thread. Callers wait at most the configured timeout; when it expires
//! the call reports [`StorageError::Timeout`] and the job still completes
//! in the background. Since every write carries the whole board, the next
//! successful save reconciles whatever a late or failed one missed.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{SnapshotStore, StorageError};
use crate::domain::BoardSnapshot;

type Reply<T> = Sender<Result<T, StorageError>>;

enum Job {
    Read(Reply<Option<BoardSnapshot>>),
    Write(Box<BoardSnapshot>, Reply<()>),
}

/// Single-writer front for a [`SnapshotStore`]
pub struct Persister {
    jobs: Mutex<Option<Sender<Job>>>,
    done: Mutex<Receiver<()>>,
    timeout: Duration,
    location: String,
}

impl Persister {
    /// Starts the worker thread for `backend`
    pub fn spawn(backend: Arc<dyn SnapshotStore>, timeout: Duration) -> Result<Self, StorageError> {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let location = backend.location();

        thread::Builder::new()
            .name("taskboard-persist".to_string())
            .spawn(move || {
                // Dropped on exit, which wakes up `close`
                let _done = done_tx;
                for job in jobs_rx {
                    match job {
                        Job::Read(reply) => {
                            let _ = reply.send(backend.read());
                        }
                        Job::Write(snapshot, reply) => {
                            let result = backend.write(&snapshot);
                            if let Err(e) = &result {
                                warn!(error = %e, "snapshot write failed");
                            }
                            let _ = reply.send(result);
                        }
                    }
                }
            })
            .map_err(|e| StorageError::io(&location, e))?;

        Ok(Self {
            jobs: Mutex::new(Some(jobs_tx)),
            done: Mutex::new(done_rx),
            timeout,
            location,
        })
    }

    /// Location of the underlying slot
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Reads the stored snapshot, or `None` if nothing was written yet
    pub fn load(&self) -> Result<Option<BoardSnapshot>, StorageError> {
        let (tx, rx) = mpsc::channel();
        self.submit(Job::Read(tx))?;
        self.wait(&rx)
    }

    /// Writes a snapshot, overwriting the previous one
    pub fn save(&self, snapshot: BoardSnapshot) -> Result<(), StorageError> {
        let (tx, rx) = mpsc::channel();
        self.submit(Job::Write(Box::new(snapshot), tx))?;
        let result = self.wait(&rx);
        if result.is_ok() {
            debug!(location = %self.location, "snapshot saved");
        }
        result
    }

    /// Stops accepting jobs and waits up to `grace` for queued ones to finish
    pub fn close(&self, grace: Duration) -> Result<(), StorageError> {
        let sender = self
            .jobs
            .lock()
            .map_err(|_| StorageError::WorkerStopped)?
            .take();
        drop(sender);

        let done = self.done.lock().map_err(|_| StorageError::WorkerStopped)?;
        match done.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Ok(()),
            Err(RecvTimeoutError::Timeout) => Err(StorageError::Timeout(grace)),
        }
    }

    fn submit(&self, job: Job) -> Result<(), StorageError> {
        let jobs = self.jobs.lock().map_err(|_| StorageError::WorkerStopped)?;
        jobs.as_ref()
            .ok_or(StorageError::WorkerStopped)?
            .send(job)
            .map_err(|_| StorageError::WorkerStopped)
    }

    fn wait<T>(&self, rx: &Receiver<Result<T, StorageError>>) -> Result<T, StorageError> {
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(StorageError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(StorageError::WorkerStopped),
        }
    }
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("location", &self.location)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
