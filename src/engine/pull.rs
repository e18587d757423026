//! engine::pull
//!
//! Bring upstream changes into a fresh staging branch cut from home.
//!
//! CheckClean -> Backup -> AcquireStagingBranch -> PullUpstream ->
//! Success | ConflictsDetected

use crate::core::types::{BranchName, BranchRole};
use crate::git::classify::{classify_pull, PullClassification};
use crate::ui::output;

use super::session::Session;
use super::state::{Outcome, WorkflowError, WorkflowPhase, WorkflowRun, WorkflowState};

/// Exit code when the operator declines to rename a colliding staging branch.
pub const DECLINED_EXIT_CODE: u8 = 1;

pub fn run_pull(session: &mut Session<'_>) -> Result<WorkflowRun, WorkflowError> {
    let config = session.config;
    let runner = session.runner;
    let branches = session.branches();
    let verbosity = session.verbosity;
    let mut state = WorkflowState::new(&config.home_branch);

    state.enter(WorkflowPhase::CheckClean);
    output::heading("Checking for uncommitted changes...", verbosity);
    let status = runner.run_checked(&["status", "--porcelain"])?;
    if !status.stdout.trim().is_empty() {
        return Err(WorkflowError::DirtyWorktree {
            details: status.stdout.trim_end().to_string(),
        });
    }
    if let Some(current) = branches.current()? {
        if current != config.home_branch {
            output::note(format!(
                "'{}' is checked out; the staging branch is cut from '{}'",
                current, config.home_branch
            ));
        }
    }

    state.enter(WorkflowPhase::Backup);
    let backup = branches.backup(&config.home_branch, &config.backup_prefix, session.now())?;
    output::success(
        format!("Backed up '{}' as '{}'.", config.home_branch, backup.name),
        verbosity,
    );
    state.backups.push(backup);

    state.enter(WorkflowPhase::AcquireStagingBranch);
    let staging_name = BranchName::new(config.staging_prefix.as_str())?;
    let staging = match branches.acquire(
        &staging_name,
        &config.home_branch,
        BranchRole::PullStaging,
        &mut *session.operator,
    )? {
        Some(branch) => branch,
        None => {
            output::note(
                "create or delete the staging branch manually, then run `forksync pull` again",
            );
            return Ok(WorkflowRun {
                outcome: Outcome::Halted {
                    reason: format!("branch '{}' already exists", staging_name),
                    exit_code: DECLINED_EXIT_CODE,
                },
                state,
            });
        }
    };
    output::success(
        format!("Created '{}' from '{}'.", staging.name, config.home_branch),
        verbosity,
    );
    let staging_label = staging.name.to_string();
    state.staging = Some(staging);

    state.enter(WorkflowPhase::PullUpstream);
    output::heading(
        format!(
            "Pulling {}/{} into '{}'...",
            config.upstream_remote, config.upstream_branch, staging_label
        ),
        verbosity,
    );
    let pulled = runner.run(&[
        "pull",
        "--no-rebase",
        "--no-edit",
        config.upstream_remote.as_str(),
        config.upstream_branch.as_str(),
    ])?;

    let outcome = match classify_pull(&pulled) {
        PullClassification::Success => {
            state.enter(WorkflowPhase::Success);
            output::success(
                format!("Pulled upstream changes into '{}'.", staging_label),
                verbosity,
            );
            output::note(format!(
                "review the result on '{}', then run `forksync push` to copy changes upstream",
                staging_label
            ));
            Outcome::Completed
        }
        PullClassification::Conflicts { details } => {
            state.enter(WorkflowPhase::ConflictsDetected);
            output::warn("the merge has conflicts", verbosity);
            if !details.is_empty() {
                output::print(output::format_list(&details, "  "), verbosity);
            }
            output::note(format!(
                "resolve the conflicts on '{}', commit, then run `forksync push`",
                staging_label
            ));
            Outcome::Recoverable {
                reason: "merge conflicts need manual resolution".to_string(),
            }
        }
        PullClassification::Failed { diagnostic } => {
            return Err(WorkflowError::PullFailed { diagnostic });
        }
    };

    Ok(WorkflowRun { outcome, state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::git::fake::FakeRunner;
    use crate::git::CommandOutput;
    use crate::ui::output::Verbosity;
    use crate::ui::prompts::ScriptedOperator;

    const LIST: &str = "for-each-ref --format=%(refname) refs/heads/";
    const PULL: &str = "pull --no-rebase --no-edit upstream main";

    fn run(runner: &FakeRunner, answers: &[&str]) -> Result<WorkflowRun, WorkflowError> {
        let config = Config::default();
        let mut operator = ScriptedOperator::new(answers.iter().copied());
        let mut session = Session::new(runner, &mut operator, &config, Verbosity::Quiet);
        run_pull(&mut session)
    }

    fn refs(names: &[&str]) -> CommandOutput {
        CommandOutput::ok(names.iter().map(|n| format!("refs/heads/{n}\n")).collect::<String>())
    }

    #[test]
    fn clean_pull_completes() {
        let runner = FakeRunner::new();
        let result = run(&runner, &[]).unwrap();

        assert_eq!(result.outcome, Outcome::Completed);
        assert_eq!(result.state.phase(), WorkflowPhase::Success);
        assert_eq!(result.state.backups[0].name.as_str(), "backup-dev");

        let calls = runner.calls();
        assert!(calls.contains(&"branch backup-dev dev".to_string()));
        assert!(calls.contains(&"checkout -b pull-from-upstream dev".to_string()));
        assert_eq!(calls.last().map(String::as_str), Some(PULL));
    }

    #[test]
    fn staging_is_cut_from_home_whatever_is_checked_out() {
        let runner = FakeRunner::new()
            .respond("rev-parse --abbrev-ref HEAD", CommandOutput::ok("feature\n"));
        let result = run(&runner, &[]).unwrap();

        assert_eq!(result.outcome, Outcome::Completed);
        let calls = runner.calls();
        assert!(calls.contains(&"rev-parse --abbrev-ref HEAD".to_string()));
        assert!(calls.contains(&"branch backup-dev dev".to_string()));
        assert!(calls.contains(&"checkout -b pull-from-upstream dev".to_string()));
    }

    #[test]
    fn dirty_tree_stops_before_any_branch_work() {
        let runner = FakeRunner::new()
            .respond("status --porcelain", CommandOutput::ok(" M src/lib.rs\n"));
        let err = run(&runner, &[]).unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::DirtyWorktree { ref details } if details.contains("src/lib.rs")
        ));
        assert_eq!(runner.calls(), vec!["status --porcelain"]);
    }

    #[test]
    fn conflicts_are_recoverable() {
        let mut conflict = CommandOutput::failed(1, "");
        conflict.stdout = "Auto-merging a.txt\n\
                           CONFLICT (content): Merge conflict in a.txt\n\
                           Automatic merge failed; fix conflicts and then commit the result.\n"
            .into();
        let runner = FakeRunner::new().respond(PULL, conflict);
        let result = run(&runner, &[]).unwrap();

        assert!(matches!(result.outcome, Outcome::Recoverable { .. }));
        assert_eq!(result.outcome.exit_code(), 0);
        assert_eq!(result.state.phase(), WorkflowPhase::ConflictsDetected);
    }

    #[test]
    fn other_pull_failures_are_fatal() {
        let runner = FakeRunner::new().respond(
            PULL,
            CommandOutput::failed(1, "fatal: 'upstream' does not appear to be a git repository\n"),
        );
        let err = run(&runner, &[]).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::PullFailed { ref diagnostic } if diagnostic.contains("does not appear")
        ));
    }

    #[test]
    fn declined_collision_halts_with_exit_one() {
        let runner = FakeRunner::new().respond(LIST, refs(&["dev", "pull-from-upstream"]));
        let result = run(&runner, &["n"]).unwrap();

        assert_eq!(result.outcome.exit_code(), DECLINED_EXIT_CODE);
        assert_eq!(result.state.phase(), WorkflowPhase::AcquireStagingBranch);
        assert!(!runner.calls().iter().any(|c| c.starts_with("pull")));
    }

    #[test]
    fn accepted_collision_uses_proposal() {
        let runner = FakeRunner::new().respond(LIST, refs(&["dev", "pull-from-upstream"]));
        let result = run(&runner, &["y"]).unwrap();

        assert_eq!(result.outcome, Outcome::Completed);
        let staging = result.state.staging.unwrap();
        assert_eq!(staging.name.as_str(), "pull-from-upstream-1");
        assert!(runner.calls().contains(&"checkout -b pull-from-upstream-1 dev".to_string()));
    }
}
