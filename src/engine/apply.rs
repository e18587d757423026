//! engine::apply
//!
//! Materialize a selected change-set into the working tree.
//!
//! Added and modified paths are checked out from the source branch, which
//! also stages them. Deleted paths are removed with `git rm`, which stages
//! the removal. A path that is already gone counts as done and is noted
//! separately. Any other failure is collected and the batch carries on: one
//! bad file does not block the rest.
//!
//! Paths are passed as literal pathspecs. A name such as `[slug].astro` must
//! never match other files as a glob.

use std::fmt;

use crate::core::types::{ChangeKind, ChangeSet};
use crate::git::classify::is_missing_path;
use crate::git::diff::{parse_name_status_z, DiffError};
use crate::git::{CommandRunner, GitError};

/// Per-path results of one apply pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub copied: Vec<String>,
    pub removed: Vec<String>,
    /// Already absent; treated as success.
    pub absent: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.copied.len() + self.removed.len() + self.absent.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded ({} copied, {} removed, {} already absent), {} failed",
            self.succeeded(),
            self.copied.len(),
            self.removed.len(),
            self.absent.len(),
            self.failed.len()
        )
    }
}

/// Apply `changes` from `source` onto the checked-out branch.
///
/// # Errors
///
/// Only if git cannot be run at all. Per-file failures land in the report.
pub fn apply_changes(
    runner: &dyn CommandRunner,
    source: &str,
    changes: &ChangeSet,
) -> Result<ApplyReport, GitError> {
    let mut report = ApplyReport::default();

    for entry in changes {
        let path = entry.path.as_str();
        let output = match entry.kind {
            ChangeKind::Added | ChangeKind::Modified => {
                runner.run(&["--literal-pathspecs", "checkout", source, "--", path])?
            }
            ChangeKind::Deleted => runner.run(&["--literal-pathspecs", "rm", "-q", "--", path])?,
        };

        if output.success() {
            match entry.kind {
                ChangeKind::Deleted => report.removed.push(path.to_string()),
                _ => report.copied.push(path.to_string()),
            }
        } else if is_missing_path(&output) {
            log::info!("{} is already absent", path);
            report.absent.push(path.to_string());
        } else {
            log::warn!("failed to apply {}: {}", path, output.diagnostic());
            report
                .failed
                .push((path.to_string(), output.diagnostic().to_string()));
        }
    }

    Ok(report)
}

/// What is currently staged, by kind.
pub fn staged_changes(runner: &dyn CommandRunner) -> Result<ChangeSet, DiffError> {
    let output = runner.run_checked(&["diff", "--cached", "--name-status", "--no-renames", "-z"])?;
    parse_name_status_z(&output.stdout)
}

/// `git diff --cached --stat`, for the operator's review.
pub fn staged_stat(runner: &dyn CommandRunner) -> Result<String, GitError> {
    let output = runner.run_checked(&["diff", "--cached", "--stat"])?;
    Ok(output.stdout)
}
