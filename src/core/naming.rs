//! core::naming
//!
//! Branch naming rules for workflow-created branches.
//!
//! # Features
//!
//! - Numeric-suffix alternatives for colliding names (`name-1`, `name-2`, ...)
//! - Backup names, with a timestamp suffix when the plain name is taken
//! - Suggested names for upstream feature branches
//!
//! All functions here are pure. Whether a name is taken is answered by the
//! caller through a predicate, so the rules can be tested without a repository.

use chrono::{DateTime, Utc};

/// Propose the first free `name-N` for a colliding `name`, counting from 1.
///
/// Deterministic: with `name-1..name-k` all taken, this returns `name-(k+1)`.
/// Never returns a name for which `taken` is true.
///
/// # Example
///
/// ```
/// use forksync::core::naming::numbered_alternative;
///
/// let existing = ["pull-from-upstream", "pull-from-upstream-1"];
/// let proposal = numbered_alternative("pull-from-upstream", |n| existing.contains(&n));
/// assert_eq!(proposal, "pull-from-upstream-2");
/// ```
pub fn numbered_alternative(name: &str, taken: impl Fn(&str) -> bool) -> String {
    (1usize..)
        .map(|n| format!("{name}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| format!("{name}-{}", usize::MAX))
}

/// Default backup name for a source branch.
///
/// ```
/// use forksync::core::naming::backup_name;
///
/// assert_eq!(backup_name("backup", "dev"), "backup-dev");
/// ```
pub fn backup_name(prefix: &str, source: &str) -> String {
    format!("{prefix}-{source}")
}

/// Backup name with a timestamp suffix, used when the default is taken.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forksync::core::naming::timestamped_backup_name;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 22, 33).unwrap();
/// assert_eq!(
///     timestamped_backup_name("backup", "dev", at),
///     "backup-dev-2024-05-01T10-22-33-000Z"
/// );
/// ```
pub fn timestamped_backup_name(prefix: &str, source: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", backup_name(prefix, source), ref_safe_timestamp(at))
}

/// ISO-8601 timestamp with `:` and `.` replaced by `-`.
///
/// Git refnames may not contain `:`, so the raw form cannot be used.
pub fn ref_safe_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-")
}

/// Suggested upstream feature branch name.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forksync::core::naming::feature_branch_suggestion;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 22, 33).unwrap();
/// assert_eq!(feature_branch_suggestion("sync", at), "sync/20240501-102233");
/// ```
pub fn feature_branch_suggestion(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}/{}", at.format("%Y%m%d-%H%M%S"))
}
