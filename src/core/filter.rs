//! core::filter
//!
//! Directory index and the include/exclude range grammar used to narrow a
//! change-set before copying.
//!
//! # Grammar
//!
//! ```text
//! expression := "" | token ("," token)*
//! token      := ["!"] index | ["!"] index "-" index
//! index      := 1-based position in the directory index
//! ```
//!
//! `!` marks exclusion. Ranges are inclusive and must be ascending.
//! An empty expression means no filtering.
//!
//! # Apply rule
//!
//! A file is decided only by its exact parent directory. Selecting `docs`
//! says nothing about `docs/sub`. Exclusion beats inclusion. With no
//! inclusions given, everything not excluded is kept. Root-level files have
//! the empty path as their parent, which never appears in the index, so they
//! survive only when nothing was explicitly included.
//!
//! # Example
//!
//! ```
//! use forksync::core::filter::{apply, parse, DirectoryIndex};
//! use forksync::core::types::{ChangeEntry, ChangeKind, ChangeSet};
//!
//! let changes = ChangeSet::from(vec![
//!     ChangeEntry::new("docs/a.md", ChangeKind::Modified),
//!     ChangeEntry::new("docs/sub/b.md", ChangeKind::Added),
//!     ChangeEntry::new("root.txt", ChangeKind::Modified),
//! ]);
//! let index = DirectoryIndex::build(&changes);
//! let filter = parse("1", index.len()).unwrap();
//! let kept = apply(&changes, &filter, &index);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept.entries()[0].path, "docs/a.md");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::core::types::ChangeSet;

/// Errors from parsing a filter expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid range '{token}': start is greater than end")]
    InvalidRange { token: String },

    #[error("'{token}' is out of bounds: directories are numbered 1 to {max}")]
    OutOfBounds { token: String, max: usize },

    #[error("'{token}' is not a number or a range like 2-5")]
    InvalidNumber { token: String },
}

/// One directory touched by a change-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: String,
    /// Changed files whose exact parent is this directory.
    pub files: usize,
    /// Changed files anywhere below this directory.
    pub nested: usize,
}

/// Numbered list of every directory (including intermediate levels) that
/// contains a changed file, sorted by path.
///
/// Derived state: rebuild it whenever the change-set changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    entries: Vec<DirectoryEntry>,
}

impl DirectoryIndex {
    /// Build the index from a change-set.
    pub fn build(changes: &ChangeSet) -> Self {
        Self::from_paths(changes.iter().map(|e| e.path.as_str()))
    }

    /// Build the index from a flat list of file paths.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        // path -> (files, nested)
        let mut dirs: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for path in paths {
            let Some((parent, _)) = path.rsplit_once('/') else {
                continue;
            };
            dirs.entry(parent.to_string()).or_default().0 += 1;

            let mut dir = parent;
            loop {
                dirs.entry(dir.to_string()).or_default().1 += 1;
                match dir.rsplit_once('/') {
                    Some((up, _)) => dir = up,
                    None => break,
                }
            }
        }

        let entries = dirs
            .into_iter()
            .map(|(path, (files, nested))| DirectoryEntry {
                path,
                files,
                nested,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Entry at a zero-based position.
    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn paths_of<'a>(&'a self, indices: &'a BTreeSet<usize>) -> BTreeSet<&'a str> {
        indices
            .iter()
            .filter_map(|&i| self.get(i))
            .map(|e| e.path.as_str())
            .collect()
    }
}

impl fmt::Display for DirectoryIndex {
    /// The operator-facing 1-based listing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.entries.len().to_string().len();
        for (i, entry) in self.entries.iter().enumerate() {
            let noun = if entry.files == 1 { "file" } else { "files" };
            write!(f, "{:>width$}: {}/ ({} {noun}", i + 1, entry.path, entry.files)?;
            if entry.nested != entry.files {
                write!(f, ", {} with subdirs", entry.nested)?;
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

/// A parsed filter: zero-based directory positions to include and exclude.
///
/// Any index in both sets is removed from `include`, so the two are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    pub include: BTreeSet<usize>,
    pub exclude: BTreeSet<usize>,
}

impl FilterExpression {
    /// True when the expression selects everything.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Parse a filter expression against an index of `dir_count` directories.
///
/// # Errors
///
/// - [`FilterError::InvalidNumber`] for a token that is neither `N` nor `N-M`
/// - [`FilterError::InvalidRange`] when `N > M`
/// - [`FilterError::OutOfBounds`] when an index is outside `1..=dir_count`
///
/// # Example
///
/// ```
/// use forksync::core::filter::{parse, FilterError};
///
/// let f = parse("1-3,!2", 5).unwrap();
/// assert_eq!(f.include.into_iter().collect::<Vec<_>>(), vec![0, 2]);
/// assert_eq!(f.exclude.into_iter().collect::<Vec<_>>(), vec![1]);
///
/// assert!(matches!(parse("1-10", 5), Err(FilterError::OutOfBounds { .. })));
/// assert!(matches!(parse("2-1", 5), Err(FilterError::InvalidRange { .. })));
/// ```
pub fn parse(expression: &str, dir_count: usize) -> Result<FilterExpression, FilterError> {
    let mut filter = FilterExpression::default();

    for raw in expression.split(',') {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }

        let (negated, body) = match token.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, token),
        };

        let (start, end) = match body.split_once('-') {
            Some((a, b)) => (
                parse_index(a, token, dir_count)?,
                parse_index(b, token, dir_count)?,
            ),
            None => {
                let n = parse_index(body, token, dir_count)?;
                (n, n)
            }
        };

        if start > end {
            return Err(FilterError::InvalidRange {
                token: token.to_string(),
            });
        }
        if start == 0 || end > dir_count {
            return Err(FilterError::OutOfBounds {
                token: token.to_string(),
                max: dir_count,
            });
        }

        let target = if negated {
            &mut filter.exclude
        } else {
            &mut filter.include
        };
        target.extend((start - 1)..end);
    }

    filter.include = filter
        .include
        .difference(&filter.exclude)
        .copied()
        .collect();
    Ok(filter)
}

fn parse_index(s: &str, token: &str, dir_count: usize) -> Result<usize, FilterError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FilterError::InvalidNumber {
            token: token.to_string(),
        });
    }
    // All digits but too large for usize: certainly past the last directory.
    s.parse().map_err(|_| FilterError::OutOfBounds {
        token: token.to_string(),
        max: dir_count,
    })
}

/// Narrow a change-set with a parsed filter.
///
/// `index` must be the index the filter was parsed against.
pub fn apply(changes: &ChangeSet, filter: &FilterExpression, index: &DirectoryIndex) -> ChangeSet {
    if filter.is_empty() {
        return changes.clone();
    }

    let include = index.paths_of(&filter.include);
    let exclude = index.paths_of(&filter.exclude);

    changes
        .iter()
        .filter(|entry| {
            let parent = entry.parent_dir();
            if exclude.contains(parent) {
                return false;
            }
            include.is_empty() || include.contains(parent)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ChangeEntry, ChangeKind};

    fn set(paths: &[&str]) -> ChangeSet {
        paths
            .iter()
            .map(|p| ChangeEntry::new(*p, ChangeKind::Modified))
            .collect()
    }

    fn paths(changes: &ChangeSet) -> Vec<&str> {
        changes.iter().map(|e| e.path.as_str()).collect()
    }

    mod index {
        use super::*;

        #[test]
        fn includes_intermediate_directories() {
            let index = DirectoryIndex::from_paths(["a/b/c/file.txt"]);
            let dirs: Vec<_> = index.entries().iter().map(|e| e.path.as_str()).collect();
            assert_eq!(dirs, vec!["a", "a/b", "a/b/c"]);
        }

        #[test]
        fn counts_direct_and_nested_files() {
            let index = DirectoryIndex::from_paths(["docs/a.md", "docs/sub/b.md", "docs/sub/c.md"]);
            assert_eq!(
                index.entries(),
                &[
                    DirectoryEntry {
                        path: "docs".into(),
                        files: 1,
                        nested: 3
                    },
                    DirectoryEntry {
                        path: "docs/sub".into(),
                        files: 2,
                        nested: 2
                    },
                ]
            );
        }

        #[test]
        fn root_files_add_no_entry() {
            let index = DirectoryIndex::from_paths(["README.md", "Cargo.toml"]);
            assert!(index.is_empty());
        }

        #[test]
        fn sorted_lexicographically() {
            let index = DirectoryIndex::from_paths(["zeta/a", "alpha/b", "mid/c"]);
            let dirs: Vec<_> = index.entries().iter().map(|e| e.path.as_str()).collect();
            assert_eq!(dirs, vec!["alpha", "mid", "zeta"]);
        }

        #[test]
        fn display_is_one_based() {
            let index = DirectoryIndex::from_paths(["docs/a.md", "docs/sub/b.md"]);
            let text = index.to_string();
            assert!(text.contains("1: docs/ (1 file, 2 with subdirs)"));
            assert!(text.contains("2: docs/sub/ (1 file)"));
        }
    }

    mod grammar {
        use super::*;

        #[test]
        fn empty_means_no_filtering() {
            assert!(parse("", 3).unwrap().is_empty());
            assert!(parse("   ", 3).unwrap().is_empty());
        }

        #[test]
        fn single_and_range_tokens() {
            let f = parse("1, 3-4", 5).unwrap();
            assert_eq!(f.include, BTreeSet::from([0, 2, 3]));
            assert!(f.exclude.is_empty());
        }

        #[test]
        fn exclusion_wins_over_inclusion() {
            let f = parse("1-3,!2", 5).unwrap();
            assert_eq!(f.include, BTreeSet::from([0, 2]));
            assert_eq!(f.exclude, BTreeSet::from([1]));
        }

        #[test]
        fn exclusion_only() {
            let f = parse("!2-3", 4).unwrap();
            assert!(f.include.is_empty());
            assert_eq!(f.exclude, BTreeSet::from([1, 2]));
        }

        #[test]
        fn rejects_out_of_bounds() {
            assert_eq!(
                parse("1-10", 5),
                Err(FilterError::OutOfBounds {
                    token: "1-10".into(),
                    max: 5
                })
            );
            assert!(matches!(parse("0", 5), Err(FilterError::OutOfBounds { .. })));
            assert!(matches!(parse("!6", 5), Err(FilterError::OutOfBounds { .. })));
        }

        #[test]
        fn rejects_descending_range() {
            assert_eq!(
                parse("2-1", 5),
                Err(FilterError::InvalidRange { token: "2-1".into() })
            );
        }

        #[test]
        fn rejects_garbage() {
            for bad in ["abc", "1-", "-1", "1-2-3", "!", "1.5", "+2"] {
                assert!(
                    matches!(parse(bad, 5), Err(FilterError::InvalidNumber { .. })),
                    "{bad} should be an invalid number"
                );
            }
        }

        #[test]
        fn huge_number_is_out_of_bounds() {
            assert!(matches!(
                parse("99999999999999999999999", 5),
                Err(FilterError::OutOfBounds { .. })
            ));
        }
    }

    mod apply_rule {
        use super::*;

        fn scenario() -> ChangeSet {
            ChangeSet::from(vec![
                ChangeEntry::new("docs/a.md", ChangeKind::Modified),
                ChangeEntry::new("docs/sub/b.md", ChangeKind::Added),
                ChangeEntry::new("root.txt", ChangeKind::Modified),
            ])
        }

        #[test]
        fn scenario_index_counts() {
            let index = DirectoryIndex::build(&scenario());
            let summary: Vec<_> = index
                .entries()
                .iter()
                .map(|e| (e.path.as_str(), e.files))
                .collect();
            assert_eq!(summary, vec![("docs", 1), ("docs/sub", 1)]);
        }

        #[test]
        fn including_parent_does_not_cascade() {
            let changes = scenario();
            let index = DirectoryIndex::build(&changes);
            let kept = apply(&changes, &parse("1", index.len()).unwrap(), &index);
            assert_eq!(paths(&kept), vec!["docs/a.md"]);
        }

        #[test]
        fn empty_filter_keeps_all() {
            let changes = scenario();
            let index = DirectoryIndex::build(&changes);
            let kept = apply(&changes, &parse("", index.len()).unwrap(), &index);
            assert_eq!(kept, changes);
        }

        #[test]
        fn exclusion_only_keeps_root_files() {
            let changes = scenario();
            let index = DirectoryIndex::build(&changes);
            let kept = apply(&changes, &parse("!2", index.len()).unwrap(), &index);
            assert_eq!(paths(&kept), vec!["docs/a.md", "root.txt"]);
        }

        #[test]
        fn excluding_parent_does_not_cascade() {
            let changes = set(&["a/x", "a/b/y", "c/z"]);
            let index = DirectoryIndex::build(&changes);
            // 1: a, 2: a/b, 3: c
            let kept = apply(&changes, &parse("!1", index.len()).unwrap(), &index);
            assert_eq!(paths(&kept), vec!["a/b/y", "c/z"]);
        }

        #[test]
        fn preserves_order() {
            let changes = set(&["b/2", "a/1", "b/3"]);
            let index = DirectoryIndex::build(&changes);
            // 1: a, 2: b
            let kept = apply(&changes, &parse("2", index.len()).unwrap(), &index);
            assert_eq!(paths(&kept), vec!["b/2", "b/3"]);
        }

        #[test]
        fn applying_twice_is_stable() {
            let changes = set(&["a/1", "a/b/2", "c/3", "top"]);
            let index = DirectoryIndex::build(&changes);
            let filter = parse("1-3,!2", index.len()).unwrap();
            let once = apply(&changes, &filter, &index);
            let twice = apply(&once, &filter, &index);
            assert_eq!(once, twice);
        }
    }
}
