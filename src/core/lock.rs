//! core::lock
//!
//! Exclusive repository lock held for the length of one workflow run.
//!
//! Both workflows assume a single operator driving one run at a time. The
//! lock turns a second concurrent `forksync` invocation on the same
//! repository into an immediate, clear failure instead of two interleaved
//! sequences of checkouts.
//!
//! # Invariants
//!
//! - Lock acquisition is non-blocking (fails fast if locked)
//! - Lock is released on drop
//!
//! # Example
//!
//! ```ignore
//! use forksync::core::lock::RepoLock;
//!
//! let lock = RepoLock::acquire(&paths)?;
//! // ... run the workflow ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::SyncPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("repository is locked by another forksync process")]
    AlreadyLocked,

    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on the repository.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: Option<File>,
}

impl RepoLock {
    /// Attempt to acquire the repository lock.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &SyncPaths) -> Result<Self, LockError> {
        let dir = paths.repo_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = paths.repo_lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                log::debug!("acquired {}", path.display());
                Ok(Self {
                    path,
                    file: Some(file),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(LockError::AlreadyLocked)
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        // Best-effort; the OS drops the lock with the handle anyway.
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
