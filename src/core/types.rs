//! core::types
//!
//! Strong types for the synchronization domain.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`BranchRole`] / [`Branch`] - A branch created by a workflow, with its designation
//! - [`ChangeKind`] / [`ChangeEntry`] - One file-level difference between two refs
//! - [`ChangeSet`] - Ordered sequence of changes, in the order git reported them
//!
//! # Validation
//!
//! Branch names are validated at construction time, so a workflow can never
//! try to create a branch git would reject.
//!
//! # Examples
//!
//! ```
//! use forksync::core::types::{BranchName, ChangeEntry, ChangeKind, ChangeSet};
//!
//! let branch = BranchName::new("pull-from-upstream").unwrap();
//! assert!(BranchName::new("invalid..name").is_err());
//!
//! let set = ChangeSet::from(vec![ChangeEntry::new("docs/a.md", ChangeKind::Modified)]);
//! assert_eq!(set.len(), 1);
//! # let _ = branch;
//! ```

use std::fmt;

use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use forksync::core::types::BranchName;
///
/// let name = BranchName::new("sync/20240101-120000").unwrap();
/// assert_eq!(name.as_str(), "sync/20240101-120000");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-dash").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("backup-dev-2024-01-01T10:00:00").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |msg: &str| Err(TypeError::InvalidBranchName(format!("'{name}': {msg}")));

        if name.is_empty() {
            return reject("branch name cannot be empty");
        }
        if name == "@" {
            return reject("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return reject("branch name cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return reject("branch name cannot end with '.lock' or '/'");
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return reject(&format!("branch name cannot contain '{bad}'"));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return reject(&format!("branch name cannot contain '{c}'"));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return reject("branch name cannot contain control characters");
        }

        for component in name.split('/') {
            if component.starts_with('.') || component.ends_with(".lock") {
                return reject("path component cannot start with '.' or end with '.lock'");
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a workflow-created branch is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    /// The operator's own branch (the home branch).
    Working,
    /// Snapshot taken before a risky step. Never deleted on failure.
    Backup,
    /// Holds the merge of upstream into the home branch.
    PullStaging,
    /// Built from the upstream ref; selected changes are copied here.
    PushStaging,
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BranchRole::Working => "working",
            BranchRole::Backup => "backup",
            BranchRole::PullStaging => "pull-staging",
            BranchRole::PushStaging => "push-staging",
        };
        f.write_str(s)
    }
}

/// A branch created (or adopted) by a workflow.
///
/// Immutable once created; the only later operation is deletion at cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: BranchName,
    pub role: BranchRole,
    /// The ref the branch was created from.
    pub base: String,
}

impl Branch {
    pub fn new(name: BranchName, role: BranchRole, base: impl Into<String>) -> Self {
        Self {
            name,
            role,
            base: base.into(),
        }
    }
}

/// Kind of a file-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    /// Single-letter code, matching `git diff --name-status`.
    pub fn code(self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// One changed path between two refs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEntry {
    /// Repository-relative path with `/` separators.
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangeEntry {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The exact immediate parent directory, or `""` for a root-level file.
    ///
    /// ```
    /// use forksync::core::types::{ChangeEntry, ChangeKind};
    ///
    /// assert_eq!(ChangeEntry::new("docs/sub/b.md", ChangeKind::Added).parent_dir(), "docs/sub");
    /// assert_eq!(ChangeEntry::new("root.txt", ChangeKind::Modified).parent_dir(), "");
    /// ```
    pub fn parent_dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.kind.code(), self.path)
    }
}

/// An ordered snapshot of changes between two refs.
///
/// Order is whatever the diff produced. An empty set is valid and means
/// there is nothing to synchronize. A set goes stale as soon as either ref
/// moves; recompute it rather than patching it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<ChangeEntry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ChangeEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, in order.
    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangeEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

impl From<Vec<ChangeEntry>> for ChangeSet {
    fn from(entries: Vec<ChangeEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<ChangeEntry> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeEntry;
    type IntoIter = std::slice::Iter<'a, ChangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
