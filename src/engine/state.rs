//! engine::state
//!
//! Workflow state, outcomes and errors.
//!
//! # Outcomes
//!
//! A workflow ends in exactly one of three ways, and only the CLI turns
//! that into a process exit code:
//!
//! - `Ok(Outcome::Completed)` - done
//! - `Ok(Outcome::Recoverable)` - stopped for manual work (merge conflicts);
//!   the printed guidance says what to do next
//! - `Ok(Outcome::Halted)` - the operator declined a step that cannot be
//!   skipped
//! - `Err(WorkflowError)` - fatal

use std::fmt;

use thiserror::Error;

use crate::core::filter::FilterExpression;
use crate::core::types::{Branch, ChangeSet, TypeError};
use crate::git::branches::BranchError;
use crate::git::diff::DiffError;
use crate::git::GitError;
use crate::ui::prompts::PromptError;

/// Phases of the pull and push state machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    // Shared
    Start,
    Backup,

    // Pull
    CheckClean,
    AcquireStagingBranch,
    PullUpstream,
    Success,
    ConflictsDetected,

    // Push
    IdentifyStagingBranch,
    AcquireUpstreamBranch,
    ResolveChangeSet,
    FilterLoop,
    ApplyChanges,
    ReviewAndCommit,
    PushDecision,
    Cleanup,
    Done,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a push went, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    Pushed { target: String },
    Skipped,
    Failed { diagnostic: String },
}

/// The orchestrator's own state. Never shared outside one run.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    phase: WorkflowPhase,
    visited: Vec<WorkflowPhase>,
    pub home: String,
    pub backups: Vec<Branch>,
    pub staging: Option<Branch>,
    pub push_staging: Option<Branch>,
    pub changes: ChangeSet,
    pub filter: Option<FilterExpression>,
    pub pushes: Vec<PushResult>,
}

impl WorkflowState {
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            phase: WorkflowPhase::Start,
            visited: vec![WorkflowPhase::Start],
            home: home.into(),
            backups: Vec::new(),
            staging: None,
            push_staging: None,
            changes: ChangeSet::new(),
            filter: None,
            pushes: Vec::new(),
        }
    }

    pub fn enter(&mut self, phase: WorkflowPhase) {
        log::debug!("phase {} -> {}", self.phase, phase);
        self.phase = phase;
        self.visited.push(phase);
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Every phase entered, in order, starting with `Start`.
    pub fn visited(&self) -> &[WorkflowPhase] {
        &self.visited
    }
}

/// How a workflow ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Recoverable { reason: String },
    Halted { reason: String, exit_code: u8 },
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed | Outcome::Recoverable { .. } => 0,
            Outcome::Halted { exit_code, .. } => *exit_code,
        }
    }
}

/// A finished run: its outcome plus the final state, for reporting and tests.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    pub outcome: Outcome,
    pub state: WorkflowState,
}

/// Fatal workflow errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("repository has uncommitted changes; commit or stash them first:\n{details}")]
    DirtyWorktree { details: String },

    #[error("no branch starting with '{prefix}' found; run `forksync pull` first")]
    NoStagingBranch { prefix: String },

    #[error("invalid selection '{answer}'")]
    InvalidSelection { answer: String },

    #[error("pull from upstream failed: {diagnostic}")]
    PullFailed { diagnostic: String },

    #[error(transparent)]
    Branch(#[from] BranchError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    InvalidName(#[from] TypeError),
}
