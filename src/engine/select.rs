//! engine::select
//!
//! The interactive filter loop: narrow a change-set by directory until the
//! operator is happy with the selection.

use crate::core::filter::{self, DirectoryIndex};
use crate::core::types::{ChangeKind, ChangeSet};
use crate::ui::output;

use super::session::Session;
use super::state::{WorkflowError, WorkflowState};

const FILTER_HELP: &str = "Enter directories to include by number, e.g. 1,3-5. \
Prefix with ! to exclude, e.g. !2. Leave empty to keep everything.";

/// One-line count of a change-set by kind.
pub fn summarize(changes: &ChangeSet) -> String {
    format!(
        "{} files: {} added, {} modified, {} deleted",
        changes.len(),
        changes.of_kind(ChangeKind::Added).count(),
        changes.of_kind(ChangeKind::Modified).count(),
        changes.of_kind(ChangeKind::Deleted).count()
    )
}

/// Let the operator pick which of `changes` to copy.
///
/// Declining the first question selects everything. A malformed expression
/// is reported and asked again. A filter that matches nothing offers a
/// retry; declining it returns the empty set.
pub fn choose(
    session: &mut Session<'_>,
    state: &mut WorkflowState,
    changes: &ChangeSet,
) -> Result<ChangeSet, WorkflowError> {
    if !session.confirm("Do you want to select which files to copy?")? {
        return Ok(changes.clone());
    }

    let verbosity = session.verbosity;
    let mut current = changes.clone();
    let mut rejected: Option<String> = None;

    loop {
        let index = DirectoryIndex::build(&current);
        let expression = session.ask(&filter_question(&index, rejected.take()))?;
        let parsed = match filter::parse(&expression, index.len()) {
            Ok(parsed) => parsed,
            Err(e) => {
                rejected = Some(e.to_string());
                continue;
            }
        };

        let narrowed = filter::apply(&current, &parsed, &index);
        log::debug!(
            "filter '{}' kept {} of {} files",
            expression.trim(),
            narrowed.len(),
            current.len()
        );
        state.filter = Some(parsed);

        if narrowed.is_empty() {
            if session.confirm("No files match that filter. Try a different filter?")? {
                continue;
            }
            return Ok(narrowed);
        }

        output::print(
            format!(
                "Selected {}:\n{}",
                summarize(&narrowed),
                output::format_list(narrowed.entries(), "  ")
            ),
            verbosity,
        );

        if !session.confirm("Apply additional filters?")? {
            return Ok(narrowed);
        }
        current = narrowed;
    }
}

/// The directory menu and filter prompt, shown as one question so the menu
/// is never hidden from the operator.
fn filter_question(index: &DirectoryIndex, rejected: Option<String>) -> String {
    let mut question = String::new();
    if let Some(reason) = rejected {
        question.push_str(&format!("invalid filter: {}\n", reason));
    }
    question.push_str("\nDirectories with changes:\n");
    if index.is_empty() {
        question.push_str("  (none; all changed files are at the top level)\n");
    } else {
        question.push_str(&index.to_string());
    }
    question.push_str(FILTER_HELP);
    question.push_str("\nFilter: ");
    question
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::types::ChangeEntry;
    use crate::git::fake::FakeRunner;
    use crate::ui::output::Verbosity;
    use crate::ui::prompts::ScriptedOperator;

    fn changes() -> ChangeSet {
        ChangeSet::from(vec![
            ChangeEntry::new("README.md", ChangeKind::Modified),
            ChangeEntry::new("docs/guide.md", ChangeKind::Added),
            ChangeEntry::new("docs/api/ref.md", ChangeKind::Modified),
            ChangeEntry::new("src/lib.rs", ChangeKind::Modified),
            ChangeEntry::new("src/old.rs", ChangeKind::Deleted),
        ])
    }

    fn paths(set: &ChangeSet) -> Vec<&str> {
        set.iter().map(|e| e.path.as_str()).collect()
    }

    fn run(answers: &[&str]) -> (ChangeSet, ScriptedOperator, WorkflowState) {
        run_on(&changes(), answers)
    }

    fn run_on(
        changes: &ChangeSet,
        answers: &[&str],
    ) -> (ChangeSet, ScriptedOperator, WorkflowState) {
        let runner = FakeRunner::new();
        let config = Config::default();
        let mut operator = ScriptedOperator::new(answers.iter().copied());
        let mut state = WorkflowState::new("dev");
        let selected = {
            let mut session = Session::new(&runner, &mut operator, &config, Verbosity::Quiet);
            choose(&mut session, &mut state, changes).unwrap()
        };
        (selected, operator, state)
    }

    #[test]
    fn declining_selects_everything() {
        let (selected, _, state) = run(&["n"]);
        assert_eq!(selected, changes());
        assert!(state.filter.is_none());
    }

    #[test]
    fn narrows_by_exact_parent() {
        // index: 1 docs, 2 docs/api, 3 src
        let (selected, operator, _) = run(&["y", "1", "n"]);
        assert_eq!(paths(&selected), vec!["docs/guide.md"]);
        assert_eq!(operator.remaining(), 0);
    }

    #[test]
    fn bad_expression_is_asked_again() {
        let (selected, operator, _) = run(&["y", "abc", "9", "!3", "n"]);
        assert_eq!(
            paths(&selected),
            vec!["README.md", "docs/guide.md", "docs/api/ref.md"]
        );
        let filter_prompts: Vec<&String> = operator
            .asked()
            .iter()
            .filter(|q| q.ends_with("Filter: "))
            .collect();
        assert_eq!(filter_prompts.len(), 3);
        assert!(!filter_prompts[0].contains("invalid filter"));
        assert!(filter_prompts[1].contains("invalid filter"));
        assert!(filter_prompts[2].contains("out of bounds"));
    }

    #[test]
    fn additional_filters_rebuild_the_index() {
        // First pass keeps docs and docs/api; second index is 1 docs, 2 docs/api.
        let (selected, _, _) = run(&["y", "1-2", "y", "2", "n"]);
        assert_eq!(paths(&selected), vec!["docs/api/ref.md"]);
    }

    #[test]
    fn empty_result_can_be_retried_or_accepted() {
        // index: 1 pkg (no direct files), 2 pkg/core, 3 src
        let nested = ChangeSet::from(vec![
            ChangeEntry::new("pkg/core/x.rs", ChangeKind::Modified),
            ChangeEntry::new("src/lib.rs", ChangeKind::Modified),
        ]);

        let (selected, _, _) = run_on(&nested, &["y", "1", "y", "3", "n"]);
        assert_eq!(paths(&selected), vec!["src/lib.rs"]);

        let (selected, _, state) = run_on(&nested, &["y", "1", "n"]);
        assert!(selected.is_empty());
        assert!(state.filter.is_some());
    }

    #[test]
    fn menu_is_part_of_the_question_even_when_quiet() {
        let (_, operator, _) = run(&["y", "", "n"]);
        let question = &operator.asked()[1];
        assert!(question.contains("Directories with changes:"));
        assert!(question.contains("1: docs/"));
        assert!(question.contains("2: docs/api/"));
        assert!(question.contains("3: src/"));
        assert!(question.contains("Prefix with ! to exclude"));
    }

    #[test]
    fn top_level_only_changes_say_so() {
        let flat = ChangeSet::from(vec![ChangeEntry::new("README.md", ChangeKind::Modified)]);
        let (selected, operator, _) = run_on(&flat, &["y", "", "n"]);
        assert_eq!(paths(&selected), vec!["README.md"]);
        assert!(operator.asked()[1].contains("all changed files are at the top level"));
    }

    #[test]
    fn summary_counts_kinds() {
        assert_eq!(
            summarize(&changes()),
            "5 files: 1 added, 3 modified, 1 deleted"
        );
    }
}
