//! engine::push
//!
//! Copy a chosen subset of the staging branch onto a branch cut from
//! upstream, review and commit it, and optionally push it.
//!
//! IdentifyStagingBranch -> Backup -> AcquireUpstreamBranch ->
//! (ResolveChangeSet -> FilterLoop -> ApplyChanges -> ReviewAndCommit ->
//! PushDecision)* -> Cleanup -> Done
//!
//! The first pass diffs upstream against staging. Later passes diff the
//! push branch against staging, so files already copied drop out.

use crate::core::naming;
use crate::core::types::{Branch, BranchName, BranchRole, ChangeKind};
use crate::git::diff::diff;
use crate::ui::output;

use super::apply::{apply_changes, staged_changes, staged_stat};
use super::select::{choose, summarize};
use super::session::Session;
use super::state::{
    Outcome, PushResult, WorkflowError, WorkflowPhase, WorkflowRun, WorkflowState,
};

/// Exit code when the operator declines to rename a colliding push branch.
pub const DECLINED_EXIT_CODE: u8 = 0;

pub fn run_push(session: &mut Session<'_>) -> Result<WorkflowRun, WorkflowError> {
    let config = session.config;
    let runner = session.runner;
    let branches = session.branches();
    let verbosity = session.verbosity;
    let mut state = WorkflowState::new(&config.home_branch);

    state.enter(WorkflowPhase::IdentifyStagingBranch);
    let staging = identify_staging(session)?;
    output::success(format!("Using staging branch '{}'.", staging), verbosity);
    state.staging = Some(Branch::new(
        staging.clone(),
        BranchRole::PullStaging,
        config.home_branch.as_str(),
    ));

    state.enter(WorkflowPhase::Backup);
    let backup = branches.backup(staging.as_str(), &config.backup_prefix, session.now())?;
    output::success(format!("Backed up '{}' as '{}'.", staging, backup.name), verbosity);
    state.backups.push(backup);

    state.enter(WorkflowPhase::AcquireUpstreamBranch);
    let upstream_ref = config.upstream_ref();
    let push_name = BranchName::new(config.push_branch.as_str())?;
    let push_branch = match branches.acquire(
        &push_name,
        &upstream_ref,
        BranchRole::PushStaging,
        &mut *session.operator,
    )? {
        Some(branch) => branch,
        None => {
            output::note(
                "create or delete the push branch manually, then run `forksync push` again",
            );
            return Ok(WorkflowRun {
                outcome: Outcome::Halted {
                    reason: format!("branch '{}' already exists", push_name),
                    exit_code: DECLINED_EXIT_CODE,
                },
                state,
            });
        }
    };
    output::success(
        format!("Created '{}' from '{}'.", push_branch.name, upstream_ref),
        verbosity,
    );
    let push_label = push_branch.name.to_string();
    state.push_staging = Some(push_branch);

    let mut base = upstream_ref;
    loop {
        state.enter(WorkflowPhase::ResolveChangeSet);
        let changes = diff(runner, &base, staging.as_str())?;
        state.changes = changes.clone();

        if changes.is_empty() {
            output::success(
                format!("No differences between '{}' and '{}'.", base, staging),
                verbosity,
            );
            break;
        }
        output::heading(
            format!("Changes from '{}' to '{}': {}", base, staging, summarize(&changes)),
            verbosity,
        );

        state.enter(WorkflowPhase::FilterLoop);
        let selected = choose(session, &mut state, &changes)?;

        if selected.is_empty() {
            output::print("No files selected.", verbosity);
        } else {
            state.enter(WorkflowPhase::ApplyChanges);
            output::heading(format!("Copying {} files...", selected.len()), verbosity);
            let report = apply_changes(runner, staging.as_str(), &selected)?;
            output::success(format!("Applied: {}.", report), verbosity);
            if !report.absent.is_empty() {
                output::print(
                    format!("Already absent:\n{}", output::format_list(&report.absent, "  ")),
                    verbosity,
                );
            }
            for (path, diagnostic) in &report.failed {
                output::warn(format!("could not apply {}: {}", path, diagnostic), verbosity);
            }

            state.enter(WorkflowPhase::ReviewAndCommit);
            show_staged(session)?;
            session.wait_for_enter("Review the staged changes, then press Enter to continue...")?;
            if !session.confirm("Have you committed the staged changes?")? {
                session.wait_for_enter("Commit the changes, then press Enter to continue...")?;
            }

            state.enter(WorkflowPhase::PushDecision);
            let pushed = push_decision(session, &push_label)?;
            state.pushes.push(pushed);
        }

        base = push_label.clone();
        if !session.confirm("Copy more files?")? {
            break;
        }
    }

    state.enter(WorkflowPhase::Cleanup);
    let temporary: Vec<BranchName> = std::iter::once(staging.clone())
        .chain(state.push_staging.iter().map(|b| b.name.clone()))
        .chain(state.backups.iter().map(|b| b.name.clone()))
        .collect();
    let listed = temporary.iter().map(|b| b.as_str()).collect::<Vec<_>>().join(", ");

    if session.confirm(&format!("Delete the temporary branches ({})?", listed))? {
        let report = branches.cleanup(&temporary, &config.home_branch)?;
        if !report.deleted.is_empty() {
            output::success(format!("Deleted {}.", report.deleted.join(", ")), verbosity);
        }
        for (name, diagnostic) in &report.failed {
            output::warn(format!("could not delete {}: {}", name, diagnostic), verbosity);
        }
    } else {
        output::print(format!("Keeping {}.", listed), verbosity);
    }

    state.enter(WorkflowPhase::Done);
    Ok(WorkflowRun {
        outcome: Outcome::Completed,
        state,
    })
}

/// Find the branch created by a previous pull.
fn identify_staging(session: &mut Session<'_>) -> Result<BranchName, WorkflowError> {
    let config = session.config;
    let prefix = config.staging_prefix.as_str();
    let mut candidates = session.branches().find_by_prefix(prefix)?;

    match candidates.len() {
        0 => Err(WorkflowError::NoStagingBranch {
            prefix: prefix.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        count => {
            let question = format!(
                "\nSeveral staging branches exist:\n{}\nWhich one should be used? (1-{}) ",
                output::format_numbered(&candidates),
                count
            );
            match session.select_index(&question, count)? {
                Some(index) => Ok(candidates.remove(index)),
                None => Err(WorkflowError::InvalidSelection {
                    answer: "expected a listed number".to_string(),
                }),
            }
        }
    }
}

/// Print what is staged, by kind, then git's own stat.
fn show_staged(session: &Session<'_>) -> Result<(), WorkflowError> {
    let verbosity = session.verbosity;
    let staged = staged_changes(session.runner)?;
    output::heading(format!("Staged: {}", summarize(&staged)), verbosity);
    for kind in [ChangeKind::Added, ChangeKind::Modified, ChangeKind::Deleted] {
        let paths: Vec<&str> = staged.of_kind(kind).map(|e| e.path.as_str()).collect();
        if !paths.is_empty() {
            output::print(format!("{:?}:\n{}", kind, output::format_list(&paths, "  ")), verbosity);
        }
    }
    let stat = staged_stat(session.runner)?;
    if !stat.trim().is_empty() {
        output::print(stat.trim_end(), verbosity);
    }
    Ok(())
}

/// Ask whether and where to push `push_branch`.
///
/// A failed push is reported and the workflow carries on.
fn push_decision(
    session: &mut Session<'_>,
    push_branch: &str,
) -> Result<PushResult, WorkflowError> {
    let config = session.config;
    let verbosity = session.verbosity;

    if !session.confirm("Push to upstream?")? {
        output::print("Skipping push.", verbosity);
        return Ok(PushResult::Skipped);
    }

    let answer = session.ask(&format!(
        "Where to?\n  1: a new feature branch on {remote} (default)\n  \
         2: {remote}/{branch} directly\nChoose 1 or 2: ",
        remote = config.upstream_remote,
        branch = config.upstream_branch
    ))?;

    let target = match answer.trim() {
        "" | "1" => feature_branch_name(session)?,
        "2" => {
            let question = format!(
                "Are you sure you want to push directly to {}/{}?",
                config.upstream_remote, config.upstream_branch
            );
            if !session.confirm(&question)? {
                output::print("Skipping push.", verbosity);
                return Ok(PushResult::Skipped);
            }
            config.upstream_branch.clone()
        }
        other => {
            return Err(WorkflowError::InvalidSelection {
                answer: other.to_string(),
            })
        }
    };

    let refspec = format!("{}:refs/heads/{}", push_branch, target);
    output::heading(
        format!("Pushing '{}' to {}/{}...", push_branch, config.upstream_remote, target),
        verbosity,
    );
    let pushed = session
        .runner
        .run(&["push", config.upstream_remote.as_str(), refspec.as_str()])?;

    if pushed.success() {
        output::success(format!("Pushed to {}/{}.", config.upstream_remote, target), verbosity);
        Ok(PushResult::Pushed { target })
    } else {
        let diagnostic = pushed.diagnostic().to_string();
        output::warn(format!("push failed: {}", diagnostic), verbosity);
        output::note(format!(
            "push '{}' to a branch you can write to and open a pull request instead",
            push_branch
        ));
        Ok(PushResult::Failed { diagnostic })
    }
}

/// Ask for a feature branch name, offering a timestamped default.
///
/// The name must be new on the remote. The upstream branch itself is only
/// reachable through the direct option and its confirmation.
fn feature_branch_name(session: &mut Session<'_>) -> Result<String, WorkflowError> {
    let config = session.config;
    let suggestion = naming::feature_branch_suggestion(&config.feature_prefix, session.now());
    let mut rejected: Option<String> = None;

    loop {
        let mut question = String::new();
        if let Some(reason) = rejected.take() {
            question.push_str(&format!("{}\n", reason));
        }
        question.push_str(&format!("Feature branch name [{}]: ", suggestion));

        let answer = session.ask(&question)?;
        let answer = answer.trim();
        let candidate = if answer.is_empty() {
            suggestion.clone()
        } else {
            match BranchName::new(answer) {
                Ok(name) => name.to_string(),
                Err(e) => {
                    rejected = Some(e.to_string());
                    continue;
                }
            }
        };

        if candidate == config.upstream_branch {
            rejected = Some(format!(
                "'{}' is the upstream branch; choose option 2 to push there directly",
                candidate
            ));
            continue;
        }
        if remote_branch_exists(session, &candidate)? {
            rejected = Some(format!(
                "'{}' already exists on {}; choose a new name",
                candidate, config.upstream_remote
            ));
            continue;
        }
        return Ok(candidate);
    }
}

/// Whether `name` is a branch on the upstream remote.
///
/// An unreachable remote counts as "no"; the push itself reports the failure.
fn remote_branch_exists(session: &Session<'_>, name: &str) -> Result<bool, WorkflowError> {
    let remote = session.config.upstream_remote.as_str();
    let refname = format!("refs/heads/{}", name);
    let listed = session
        .runner
        .run(&["ls-remote", "--heads", remote, refname.as_str()])?;
    if !listed.success() {
        log::warn!("could not list branches on {}: {}", remote, listed.diagnostic());
        return Ok(false);
    }
    Ok(!listed.stdout.trim().is_empty())
}
