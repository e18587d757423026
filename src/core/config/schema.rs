//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same file shape is used for the global and the repo scope. Every key
//! is optional; unset keys fall through to the next scope and finally to the
//! built-in defaults.
//!
//! # Validation
//!
//! Branch-valued keys must be valid git branch names and the remote must be
//! a bare identifier. Validation runs after parsing.

use serde::Deserialize;

use super::ConfigError;
use crate::core::types::BranchName;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// home_branch = "dev"
/// upstream_remote = "upstream"
/// upstream_branch = "main"
/// staging_prefix = "pull-from-upstream"
/// push_branch = "push-to-upstream"
/// backup_prefix = "backup"
/// feature_prefix = "sync"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfigFile {
    /// Branch pull starts from and cleanup returns to
    pub home_branch: Option<String>,

    /// Remote holding the upstream repository
    pub upstream_remote: Option<String>,

    /// Upstream branch to pull from and push to
    pub upstream_branch: Option<String>,

    /// Name of the pull staging branch, and the prefix push searches for
    pub staging_prefix: Option<String>,

    /// Name of the push staging branch
    pub push_branch: Option<String>,

    /// Backup branches are named `<backup_prefix>-<source>`
    pub backup_prefix: Option<String>,

    /// Suggested upstream feature branches are `<feature_prefix>/<timestamp>`
    pub feature_prefix: Option<String>,
}

impl SyncConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let branch_keys = [
            ("home_branch", &self.home_branch),
            ("upstream_branch", &self.upstream_branch),
            ("staging_prefix", &self.staging_prefix),
            ("push_branch", &self.push_branch),
            ("backup_prefix", &self.backup_prefix),
            ("feature_prefix", &self.feature_prefix),
        ];
        for (key, value) in branch_keys {
            if let Some(v) = value {
                BranchName::new(v.as_str())
                    .map_err(|e| ConfigError::InvalidValue(format!("{key}: {e}")))?;
            }
        }

        if let Some(remote) = &self.upstream_remote {
            if remote.is_empty() || remote.chars().any(|c| c.is_whitespace() || c == '/') {
                return Err(ConfigError::InvalidValue(format!(
                    "upstream_remote: '{remote}' is not a valid remote name"
                )));
            }
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`; set keys in `other` win.
    pub fn merged_with(self, other: SyncConfigFile) -> SyncConfigFile {
        SyncConfigFile {
            home_branch: other.home_branch.or(self.home_branch),
            upstream_remote: other.upstream_remote.or(self.upstream_remote),
            upstream_branch: other.upstream_branch.or(self.upstream_branch),
            staging_prefix: other.staging_prefix.or(self.staging_prefix),
            push_branch: other.push_branch.or(self.push_branch),
            backup_prefix: other.backup_prefix.or(self.backup_prefix),
            feature_prefix: other.feature_prefix.or(self.feature_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let toml = r#"
            home_branch = "develop"
            upstream_remote = "source"
            upstream_branch = "trunk"
            staging_prefix = "from-source"
            push_branch = "to-source"
            backup_prefix = "bak"
            feature_prefix = "contrib"
        "#;
        let file: SyncConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(file.home_branch.as_deref(), Some("develop"));
        assert_eq!(file.feature_prefix.as_deref(), Some("contrib"));
        assert!(file.validate().is_ok());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<SyncConfigFile, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_branch_rejected() {
        let file = SyncConfigFile {
            home_branch: Some("has space".into()),
            ..Default::default()
        };
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("home_branch"));
    }

    #[test]
    fn invalid_remote_rejected() {
        let file = SyncConfigFile {
            upstream_remote: Some("up stream".into()),
            ..Default::default()
        };
        assert!(file.validate().is_err());
    }

    #[test]
    fn merge_prefers_overlay() {
        let base = SyncConfigFile {
            home_branch: Some("dev".into()),
            upstream_branch: Some("main".into()),
            ..Default::default()
        };
        let overlay = SyncConfigFile {
            upstream_branch: Some("trunk".into()),
            ..Default::default()
        };
        let merged = base.merged_with(overlay);
        assert_eq!(merged.home_branch.as_deref(), Some("dev"));
        assert_eq!(merged.upstream_branch.as_deref(), Some("trunk"));
    }
}
