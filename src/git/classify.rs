//! git::classify
//!
//! Best-effort classification of git's human-readable diagnostics.
//!
//! Exit codes alone are ambiguous: `git pull` exits 1 both for a merge that
//! stopped on conflicts and for plenty of unrelated failures. These
//! functions look for known marker text instead. They match the C-locale
//! output of current git releases ([`crate::git::GitCli`] forces `LC_ALL=C`)
//! and are not a parser of git's output format. Extend the marker tables if
//! a git version words things differently.

use crate::git::CommandOutput;

/// Text that marks a merge stopped on conflicts.
pub const CONFLICT_MARKERS: &[&str] = &[
    "CONFLICT (",
    "Automatic merge failed",
    "fix conflicts and then commit",
];

/// Text that marks a pathspec the source ref does not contain.
pub const MISSING_PATH_MARKERS: &[&str] = &[
    "did not match any file(s) known to git",
    "did not match any files",
];

/// How a `git pull` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullClassification {
    /// Exit 0.
    Success,
    /// Non-zero exit with conflict markers. Carries the `CONFLICT` lines.
    Conflicts { details: Vec<String> },
    /// Any other non-zero exit.
    Failed { diagnostic: String },
}

/// Classify the result of `git pull`.
///
/// # Example
///
/// ```
/// use forksync::git::classify::{classify_pull, PullClassification};
/// use forksync::git::CommandOutput;
///
/// let mut out = CommandOutput::failed(1, "");
/// out.stdout = "CONFLICT (content): Merge conflict in a.txt\n\
///               Automatic merge failed; fix conflicts and then commit the result.\n".into();
/// assert!(matches!(classify_pull(&out), PullClassification::Conflicts { .. }));
/// ```
pub fn classify_pull(output: &CommandOutput) -> PullClassification {
    if output.success() {
        return PullClassification::Success;
    }

    let text = output.combined();
    if has_conflict_markers(&text) {
        let details = text
            .lines()
            .filter(|line| line.trim_start().starts_with("CONFLICT"))
            .map(|line| line.trim().to_string())
            .collect();
        PullClassification::Conflicts { details }
    } else {
        PullClassification::Failed {
            diagnostic: output.diagnostic().to_string(),
        }
    }
}

/// True if `text` contains any conflict marker.
pub fn has_conflict_markers(text: &str) -> bool {
    CONFLICT_MARKERS.iter().any(|marker| text.contains(marker))
}

/// True if a failed checkout/rm was about a path the source does not have.
pub fn is_missing_path(output: &CommandOutput) -> bool {
    !output.success() && {
        let text = output.combined();
        MISSING_PATH_MARKERS.iter().any(|marker| text.contains(marker))
    }
}
