//! Property-based tests for the directory filter and branch naming.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use forksync::core::filter::{apply, parse, DirectoryIndex, FilterError};
use forksync::core::naming::numbered_alternative;
use forksync::core::types::{BranchName, ChangeEntry, ChangeKind, ChangeSet};

/// Strategy for one path segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// Strategy for a relative file path, zero to three directories deep.
fn file_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..=4).prop_map(|parts| parts.join("/"))
}

fn change_kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Added),
        Just(ChangeKind::Modified),
        Just(ChangeKind::Deleted),
    ]
}

/// Strategy for a change-set with unique paths.
fn change_set() -> impl Strategy<Value = ChangeSet> {
    prop::collection::btree_map(file_path(), change_kind(), 0..30)
        .prop_map(|files| {
            files
                .into_iter()
                .map(|(path, kind)| ChangeEntry::new(path, kind))
                .collect()
        })
}

/// Strategy for a syntactically valid filter expression over `n` directories.
fn expression(n: usize) -> impl Strategy<Value = String> {
    let token = (1..=n, 1..=n, any::<bool>(), any::<bool>()).prop_map(|(a, b, range, not)| {
        let (lo, hi) = (a.min(b), a.max(b));
        let body = if range {
            format!("{lo}-{hi}")
        } else {
            lo.to_string()
        };
        if not {
            format!("!{body}")
        } else {
            body
        }
    });
    prop::collection::vec(token, 0..6).prop_map(|tokens| tokens.join(","))
}

/// A change-set together with a valid expression over its index.
fn change_set_and_expression() -> impl Strategy<Value = (ChangeSet, String)> {
    change_set()
        .prop_filter("needs at least one directory", |set| {
            !DirectoryIndex::build(set).is_empty()
        })
        .prop_flat_map(|set| {
            let n = DirectoryIndex::build(&set).len();
            (Just(set), expression(n))
        })
}

proptest! {
    /// An empty expression selects the whole change-set.
    #[test]
    fn empty_filter_is_identity(set in change_set()) {
        let index = DirectoryIndex::build(&set);
        let filter = parse("", index.len()).unwrap();
        prop_assert_eq!(apply(&set, &filter, &index), set);
    }

    /// Filtering never invents entries and keeps their order.
    #[test]
    fn filter_result_is_ordered_subset((set, expr) in change_set_and_expression()) {
        let index = DirectoryIndex::build(&set);
        let filter = parse(&expr, index.len()).unwrap();
        let result = apply(&set, &filter, &index);

        let mut source = set.iter();
        for entry in &result {
            prop_assert!(source.any(|e| e == entry));
        }
    }

    /// Applying the same filter twice against the same index changes nothing.
    #[test]
    fn filter_is_idempotent((set, expr) in change_set_and_expression()) {
        let index = DirectoryIndex::build(&set);
        let filter = parse(&expr, index.len()).unwrap();
        let once = apply(&set, &filter, &index);
        let twice = apply(&once, &filter, &index);
        prop_assert_eq!(once, twice);
    }

    /// Include and exclude never overlap after parsing.
    #[test]
    fn include_and_exclude_are_disjoint((set, expr) in change_set_and_expression()) {
        let filter = parse(&expr, DirectoryIndex::build(&set).len()).unwrap();
        prop_assert!(filter.include.is_disjoint(&filter.exclude));
    }

    /// Every directory holding a changed file is listed, parents included.
    #[test]
    fn index_covers_every_ancestor(set in change_set()) {
        let index = DirectoryIndex::build(&set);
        for entry in &set {
            let mut dir = entry.parent_dir();
            while !dir.is_empty() {
                prop_assert!(index.entries().iter().any(|e| e.path == dir), "missing {}", dir);
                dir = dir.rsplit_once('/').map(|(up, _)| up).unwrap_or("");
            }
        }
    }

    /// Indices past the end are always rejected.
    #[test]
    fn out_of_range_index_rejected(n in 0usize..20, extra in 1usize..100) {
        let token = (n + extra).to_string();
        let rejected = matches!(parse(&token, n), Err(FilterError::OutOfBounds { .. }));
        prop_assert!(rejected);
    }

    /// The proposed alternative is free and is the lowest free suffix.
    #[test]
    fn numbered_alternative_is_lowest_free(
        taken_count in 0usize..10,
        gap in proptest::option::of(1usize..10),
    ) {
        let base = "pull-from-upstream";
        let mut taken: Vec<String> = vec![base.to_string()];
        for i in 1..=taken_count {
            if Some(i) != gap {
                taken.push(format!("{base}-{i}"));
            }
        }

        let proposal = numbered_alternative(base, |n| taken.iter().any(|t| t == n));
        prop_assert!(!taken.contains(&proposal));
        prop_assert!(BranchName::new(proposal.as_str()).is_ok());

        let expected = match gap {
            Some(g) if g <= taken_count => g,
            _ => taken_count + 1,
        };
        prop_assert_eq!(proposal, format!("{base}-{expected}"));
    }
}
