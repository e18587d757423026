//! core::paths
//!
//! Centralized path routing for forksync storage locations.
//!
//! # Storage Layout
//!
//! Everything forksync keeps on disk lives under `<git_dir>/forksync/`:
//! - `config.toml` - Repository configuration
//! - `lock` - Exclusive lock file
//!
//! Workflow progress itself is never persisted here; the staging and backup
//! branches are the checkpoints.
//!
//! # Example
//!
//! ```
//! use forksync::core::paths::SyncPaths;
//! use std::path::PathBuf;
//!
//! let paths = SyncPaths::new(PathBuf::from("/repo/.git"));
//! assert_eq!(
//!     paths.repo_config_path(),
//!     PathBuf::from("/repo/.git/forksync/config.toml")
//! );
//! ```

use std::path::PathBuf;

use crate::git::RepoInfo;

/// Path routing for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    /// Path to the shared git directory (refs, objects, config).
    pub git_dir: PathBuf,
}

impl SyncPaths {
    pub fn new(git_dir: PathBuf) -> Self {
        Self { git_dir }
    }

    /// Create SyncPaths from a discovered repository.
    pub fn from_repo_info(info: &RepoInfo) -> Self {
        Self::new(info.common_dir.clone())
    }

    /// Root forksync directory: `<git_dir>/forksync`.
    pub fn repo_dir(&self) -> PathBuf {
        self.git_dir.join("forksync")
    }

    /// `<git_dir>/forksync/config.toml`
    pub fn repo_config_path(&self) -> PathBuf {
        self.repo_dir().join("config.toml")
    }

    /// `<git_dir>/forksync/lock`
    pub fn repo_lock_path(&self) -> PathBuf {
        self.repo_dir().join("lock")
    }
}
