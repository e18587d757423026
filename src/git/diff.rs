//! git::diff
//!
//! Change-set resolution: which files differ between two refs, and how.
//!
//! Runs `git diff --name-status --no-renames -z <from> <to>` and parses the
//! NUL-separated records. `-z` keeps paths verbatim (no C-style quoting of
//! unusual characters). Renames are disabled at the source, but rename and
//! copy records are still understood in case a caller's git config forces
//! them: a rename becomes a deletion of the old path plus an addition of the
//! new one, a copy an addition.

use thiserror::Error;

use crate::core::types::{ChangeEntry, ChangeKind, ChangeSet};
use crate::git::{CommandRunner, GitError};

/// Errors from change-set resolution.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The diff command itself failed (unknown ref, corrupt repo, ...).
    #[error("diff between '{from}' and '{to}' failed: {diagnostic}")]
    DiffFailed {
        from: String,
        to: String,
        diagnostic: String,
    },

    /// Output did not follow the `--name-status -z` record layout.
    #[error("unexpected diff output: {0}")]
    Malformed(String),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Compute the changes that take `from` to `to`.
///
/// An empty change-set is a valid answer, distinct from an error.
///
/// # Errors
///
/// [`DiffError::DiffFailed`] carrying git's own diagnostic if the command
/// exits non-zero.
pub fn diff(runner: &dyn CommandRunner, from: &str, to: &str) -> Result<ChangeSet, DiffError> {
    let output = runner.run(&["diff", "--name-status", "--no-renames", "-z", from, to, "--"])?;
    if !output.success() {
        return Err(DiffError::DiffFailed {
            from: from.to_string(),
            to: to.to_string(),
            diagnostic: output.diagnostic().to_string(),
        });
    }

    let changes = parse_name_status_z(&output.stdout)?;
    log::debug!("{}..{}: {} changed path(s)", from, to, changes.len());
    Ok(changes)
}

/// Parse `git diff --name-status -z` output.
///
/// # Example
///
/// ```
/// use forksync::git::diff::parse_name_status_z;
/// use forksync::core::types::ChangeKind;
///
/// let set = parse_name_status_z("M\0docs/a.md\0A\0new.txt\0D\0old.txt\0").unwrap();
/// let kinds: Vec<_> = set.iter().map(|e| e.kind).collect();
/// assert_eq!(kinds, vec![ChangeKind::Modified, ChangeKind::Added, ChangeKind::Deleted]);
/// ```
pub fn parse_name_status_z(text: &str) -> Result<ChangeSet, DiffError> {
    let mut fields = text.split('\0').filter(|f| !f.is_empty());
    let mut changes = ChangeSet::new();

    while let Some(status) = fields.next() {
        let status = status.trim();
        let mut path = |what: &str| {
            fields
                .next()
                .map(str::to_string)
                .ok_or_else(|| DiffError::Malformed(format!("status '{status}' without {what}")))
        };

        match status.chars().next() {
            Some('A') => changes.push(ChangeEntry::new(path("path")?, ChangeKind::Added)),
            Some('M' | 'T' | 'U') => {
                changes.push(ChangeEntry::new(path("path")?, ChangeKind::Modified))
            }
            Some('D') => changes.push(ChangeEntry::new(path("path")?, ChangeKind::Deleted)),
            Some('R') => {
                let old = path("source path")?;
                let new = path("destination path")?;
                changes.push(ChangeEntry::new(old, ChangeKind::Deleted));
                changes.push(ChangeEntry::new(new, ChangeKind::Added));
            }
            Some('C') => {
                let _source = path("source path")?;
                changes.push(ChangeEntry::new(path("destination path")?, ChangeKind::Added));
            }
            _ => {
                let skipped = path("path")?;
                log::warn!("ignoring diff record with status '{}': {}", status, skipped);
            }
        }
    }

    Ok(changes)
}
