//! git::interface
//!
//! The command-execution doorway to Git.
//!
//! Every workflow step that touches the repository goes through a
//! [`CommandRunner`]. The production runner, [`GitCli`], spawns the `git`
//! binary in the repository's work tree and captures its output. Tests swap
//! in a scripted runner.
//!
//! # Two calling modes
//!
//! - [`CommandRunner::run`] never fails on a non-zero exit. It hands back the
//!   raw [`CommandOutput`] so the caller can tell a real error from an
//!   expected non-zero exit that carries diagnostics (a merge that stops on
//!   conflicts, a checkout of a path the source no longer has).
//! - [`CommandRunner::run_checked`] turns a non-zero exit into
//!   [`GitError::CommandFailed`], for steps where failure means the
//!   workflow cannot continue.
//!
//! Neither mode terminates the process. The orchestrator decides that.
//!
//! # Repository discovery
//!
//! [`discover`] uses `git2` to find the enclosing repository and its work
//! tree before any command runs. Bare repositories are rejected.
//!
//! # Example
//!
//! ```ignore
//! use forksync::git::{discover, CommandRunner, GitCli};
//! use std::path::Path;
//!
//! let info = discover(Path::new("."))?;
//! let git = GitCli::new(&info.work_dir);
//! let status = git.run_checked(&["status", "--porcelain"])?;
//! println!("clean: {}", status.stdout.trim().is_empty());
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The git process could not be started at all.
    #[error("failed to run {program}: {message}")]
    SpawnFailed { program: String, message: String },

    /// A checked command exited non-zero.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatusText,
        stderr: String,
    },
}

/// Printable exit status (`exit 128`, or `signal` when killed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatusText(pub Option<i32>);

impl std::fmt::Display for ExitStatusText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(code) => write!(f, "exit {}", code),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Captured result of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// A successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(code),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, for diagnostics that may land on either.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !text.is_empty() && !self.stderr.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }

    /// The most useful one-block diagnostic: stderr, else stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs git subcommands against one repository.
pub trait CommandRunner {
    /// Run `git <args>` and return the raw result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Only [`GitError::SpawnFailed`]: the process could not be started.
    fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError>;

    /// Run `git <args>`, treating a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// [`GitError::CommandFailed`] with the captured stderr on non-zero exit.
    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.run(args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                status: ExitStatusText(output.exit_code),
                stderr: output.diagnostic().to_string(),
            })
        }
    }
}

/// The production runner: spawns the `git` binary in a work tree.
///
/// Output is forced to the C locale so the diagnostic text matched by
/// [`crate::git::classify`] does not vary with the operator's language.
#[derive(Debug, Clone)]
pub struct GitCli {
    work_dir: PathBuf,
    program: OsString,
}

impl GitCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            program: OsString::from("git"),
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl CommandRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        log::debug!("git {}", args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| GitError::SpawnFailed {
                program: self.program.to_string_lossy().into_owned(),
                message: e.to_string(),
            })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        if !result.success() {
            log::debug!(
                "git {} -> {}: {}",
                args.join(" "),
                ExitStatusText(result.exit_code),
                result.diagnostic()
            );
        }
        Ok(result)
    }
}

/// Information about a discovered repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to the per-worktree .git directory
    pub git_dir: PathBuf,
    /// Path to the shared .git directory (differs from `git_dir` in linked worktrees)
    pub common_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// Find the repository enclosing `path`.
///
/// # Errors
///
/// - [`GitError::NotARepo`] if no repository is found
/// - [`GitError::BareRepo`] if the repository has no working directory
pub fn discover(path: &Path) -> Result<RepoInfo, GitError> {
    let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
        path: path.to_path_buf(),
    })?;

    let work_dir = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

    Ok(RepoInfo {
        git_dir: repo.path().to_path_buf(),
        common_dir: repo.commondir().to_path_buf(),
        work_dir,
    })
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted runner for unit tests.

    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use super::{CommandOutput, CommandRunner, GitError};

    /// Answers each command line from a queue of canned outputs.
    ///
    /// The last queued output for a command repeats once the queue is down
    /// to one. Unscripted commands succeed with empty output.
    #[derive(Debug, Default)]
    pub(crate) struct FakeRunner {
        responses: RefCell<HashMap<String, VecDeque<CommandOutput>>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, command: &str, output: CommandOutput) -> Self {
            self.responses
                .borrow_mut()
                .entry(command.to_string())
                .or_default()
                .push_back(output);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
            let line = args.join(" ");
            self.calls.borrow_mut().push(line.clone());

            let mut responses = self.responses.borrow_mut();
            let output = match responses.get_mut(&line) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            Ok(output.unwrap_or_else(|| CommandOutput::ok("")))
        }
    }
}
