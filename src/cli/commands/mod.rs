//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository and loads configuration
//! 2. Takes the repository lock
//! 3. Runs the workflow against the real git binary and the terminal
//! 4. Maps the outcome to an exit code
//!
//! Handlers do NOT run git themselves.

mod pull;
mod push;

pub use pull::pull;
pub use push::push;

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::lock::RepoLock;
use crate::core::paths::SyncPaths;
use crate::engine::{Context, Outcome, WorkflowRun};
use crate::git::{self, GitCli};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Pull => pull::pull(ctx),
        Command::Push => push::push(ctx),
    }
}

/// A repository opened for one workflow run. Holds the lock until dropped.
#[derive(Debug)]
pub(crate) struct Workspace {
    pub git: GitCli,
    pub config: Config,
    _lock: RepoLock,
}

impl Workspace {
    pub(crate) fn open(ctx: &Context) -> Result<Self> {
        let cwd = match &ctx.cwd {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let info = git::discover(&cwd).context("Failed to open repository")?;
        log::debug!("repository at {}", info.work_dir.display());

        let paths = SyncPaths::from_repo_info(&info);
        let config = Config::load(Some(&paths)).context("Failed to load config")?;
        for source in &config.sources {
            log::debug!("config from {}", source.display());
        }

        let lock = RepoLock::acquire(&paths)?;
        Ok(Self {
            git: GitCli::new(info.work_dir),
            config,
            _lock: lock,
        })
    }
}

/// Report how a workflow ended and pick the exit code.
pub(crate) fn finish(run: &WorkflowRun, ctx: &Context) -> ExitCode {
    let verbosity = ctx.verbosity();
    log::debug!("finished in phase {}", run.state.phase());

    match &run.outcome {
        Outcome::Completed => output::success("Done.", verbosity),
        Outcome::Recoverable { reason } => output::warn(format!("stopped: {}", reason), verbosity),
        Outcome::Halted { reason, .. } => output::print(format!("Stopped: {}.", reason), verbosity),
    }
    ExitCode::from(run.outcome.exit_code())
}
