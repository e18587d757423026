//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The workflows themselves take no flags; the names they work with (home
//! branch, upstream remote, staging branch names) come from configuration.
//! There are two scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//!
//! # Global Config Locations
//!
//! Searched in order, first hit wins:
//! 1. `$FORKSYNC_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/forksync/config.toml`
//! 3. `~/.forksync/config.toml`
//!
//! # Repo Config Location
//!
//! `<git_dir>/forksync/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use forksync::core::config::Config;
//! use forksync::core::paths::SyncPaths;
//! use std::path::PathBuf;
//!
//! let paths = SyncPaths::new(PathBuf::from("/repo/.git"));
//! let config = Config::load(Some(&paths)).unwrap();
//! println!("upstream: {}", config.upstream_ref());
//! ```

pub mod schema;

pub use schema::SyncConfigFile;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::paths::SyncPaths;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Resolved configuration with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub home_branch: String,
    pub upstream_remote: String,
    pub upstream_branch: String,
    pub staging_prefix: String,
    pub push_branch: String,
    pub backup_prefix: String,
    pub feature_prefix: String,
    /// Files that contributed, in load order.
    pub sources: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(SyncConfigFile::default(), Vec::new())
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `paths` is provided, the repo-scoped file is layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. Missing files are not an error.
    pub fn load(paths: Option<&SyncPaths>) -> Result<Self, ConfigError> {
        let mut sources = Vec::new();
        let mut merged = SyncConfigFile::default();

        if let Some(path) = Self::global_path() {
            merged = merged.merged_with(Self::read_file(&path)?);
            sources.push(path);
        }

        if let Some(paths) = paths {
            let path = paths.repo_config_path();
            if path.exists() {
                merged = merged.merged_with(Self::read_file(&path)?);
                sources.push(path);
            }
        }

        log::debug!("config sources: {:?}", sources);
        Ok(Self::resolve(merged, sources))
    }

    /// Find the global config file, if any.
    fn global_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("FORKSYNC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!(
                "FORKSYNC_CONFIG points to {}, which does not exist; ignoring it",
                path.display()
            );
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("forksync/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".forksync/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read, parse and validate one file.
    pub fn read_file(path: &Path) -> Result<SyncConfigFile, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: SyncConfigFile =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        file.validate()?;
        Ok(file)
    }

    fn resolve(file: SyncConfigFile, sources: Vec<PathBuf>) -> Self {
        Self {
            home_branch: file.home_branch.unwrap_or_else(|| "dev".into()),
            upstream_remote: file.upstream_remote.unwrap_or_else(|| "upstream".into()),
            upstream_branch: file.upstream_branch.unwrap_or_else(|| "main".into()),
            staging_prefix: file
                .staging_prefix
                .unwrap_or_else(|| "pull-from-upstream".into()),
            push_branch: file.push_branch.unwrap_or_else(|| "push-to-upstream".into()),
            backup_prefix: file.backup_prefix.unwrap_or_else(|| "backup".into()),
            feature_prefix: file.feature_prefix.unwrap_or_else(|| "sync".into()),
            sources,
        }
    }

    /// The remote-tracking ref for the upstream branch, e.g. `upstream/main`.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.upstream_remote, self.upstream_branch)
    }
}
