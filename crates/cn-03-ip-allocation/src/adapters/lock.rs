//! # Store Lock
//!
//! Advisory exclusive lock (flock on Unix, LockFile on Windows via `fs2`)
//! held for the duration of one read-modify-write of a mapping store.
//!
//! Only cooperating processes on the same host are serialised.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

/// How long to wait for a competing holder.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from store locking.
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created.
    #[error("Failed to create lock file {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Another process kept the lock past the timeout.
    #[error("Mapping store is locked by another process ({path})")]
    Timeout { path: PathBuf },
}

/// Exclusive lock on one network's mapping store, released on drop.
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock file at `path`, retrying with capped exponential
    /// backoff until `timeout`.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let deadline = Instant::now() + timeout;
        let mut retry_delay = Duration::from_millis(20);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|source| LockError::CreateFailed {
                path: path.to_path_buf(),
                source,
            })?;

        loop {
            if file.try_lock_exclusive().is_ok() {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }
            if Instant::now() >= deadline {
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                });
            }
            std::thread::sleep(retry_delay);
            retry_delay = (retry_delay * 2).min(Duration::from_millis(250));
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // The lock file itself stays; removing it would race a waiting opener.
        #[allow(clippy::incompatible_msrv)]
        let _ = self.file.unlock();
    }
}
