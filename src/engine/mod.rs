//! engine
//!
//! The workflow orchestrator: drives the pull and push state machines
//! against a git runner and an operator.
//!
//! # Architecture
//!
//! ```text
//! pull: CheckClean -> Backup -> AcquireStagingBranch -> PullUpstream
//!       -> Success | ConflictsDetected
//!
//! push: IdentifyStagingBranch -> Backup -> AcquireUpstreamBranch
//!       -> (ResolveChangeSet -> FilterLoop -> ApplyChanges
//!           -> ReviewAndCommit -> PushDecision)*
//!       -> Cleanup -> Done
//! ```
//!
//! # Invariants
//!
//! - Every mutation goes through the [`CommandRunner`](crate::git::CommandRunner)
//!   carried by the [`Session`]
//! - Every question goes through the session's operator
//! - A backup branch exists before any staging branch is created
//! - The home branch is never deleted
//! - Workflows return an [`Outcome`]; only the CLI picks an exit code

pub mod apply;
pub mod pull;
pub mod push;
pub mod select;
pub mod session;
pub mod state;

pub use apply::{apply_changes, ApplyReport};
pub use pull::run_pull;
pub use push::run_push;
pub use session::Session;
pub use state::{Outcome, PushResult, WorkflowError, WorkflowPhase, WorkflowRun, WorkflowState};

use std::path::PathBuf;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
