//! git::branches
//!
//! Branch manager: creates, names, backs up and cleans up the branches the
//! workflows use.
//!
//! # Invariants
//!
//! - Existence checks compare full branch names exactly. `foo` does not
//!   exist just because `foo-bar` does.
//! - [`BranchManager::create_from`] never overwrites: an existing name is a
//!   [`BranchError::NameCollision`] the caller must resolve first.
//! - Collision alternatives are proposed deterministically (`name-1`,
//!   `name-2`, ...) and always offered to the operator, who may accept,
//!   decline, or type a different name.
//! - Backups never collide: the timestamped form is used when the plain
//!   backup name is taken.
//! - Cleanup is best-effort. Branches that are already gone are skipped.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::naming;
use crate::core::types::{Branch, BranchName, BranchRole, TypeError};
use crate::git::{CommandRunner, GitError};
use crate::ui::prompts::{Operator, PromptError};

/// Errors from branch operations.
#[derive(Debug, Error)]
pub enum BranchError {
    #[error("branch '{name}' already exists")]
    NameCollision { name: String },

    #[error(transparent)]
    InvalidName(#[from] TypeError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// What a cleanup pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: Vec<String>,
    /// Requested but already gone.
    pub missing: Vec<String>,
    /// Deletion attempted and refused, with git's diagnostic.
    pub failed: Vec<(String, String)>,
}

/// Branch operations over a [`CommandRunner`].
///
/// Stateless: every query asks git afresh.
pub struct BranchManager<'a> {
    runner: &'a dyn CommandRunner,
}

impl std::fmt::Debug for BranchManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchManager").finish_non_exhaustive()
    }
}

impl<'a> BranchManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// All local branch names, sorted by name.
    pub fn list(&self) -> Result<Vec<String>, BranchError> {
        let output = self
            .runner
            .run_checked(&["for-each-ref", "--format=%(refname)", "refs/heads/"])?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.trim().strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect())
    }

    /// Exact-match existence check.
    pub fn exists(&self, name: &str) -> Result<bool, BranchError> {
        Ok(self.list()?.iter().any(|b| b == name))
    }

    /// Branches whose name starts with `prefix`, sorted by name.
    ///
    /// This is how push rediscovers the pull staging branch from a fresh
    /// process.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<BranchName>, BranchError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|b| b.starts_with(prefix))
            .filter_map(|b| BranchName::new(b).ok())
            .collect())
    }

    /// The checked-out branch, or `None` on a detached HEAD.
    pub fn current(&self) -> Result<Option<String>, BranchError> {
        let output = self
            .runner
            .run_checked(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = output.stdout.trim();
        Ok((name != "HEAD" && !name.is_empty()).then(|| name.to_string()))
    }

    /// Create `name` from `base` and check it out.
    ///
    /// # Errors
    ///
    /// [`BranchError::NameCollision`] if `name` already exists.
    pub fn create_from(
        &self,
        name: &BranchName,
        base: &str,
        role: BranchRole,
    ) -> Result<Branch, BranchError> {
        if self.exists(name.as_str())? {
            return Err(BranchError::NameCollision {
                name: name.to_string(),
            });
        }
        self.runner
            .run_checked(&["checkout", "-b", name.as_str(), base])?;
        log::debug!("created {} branch {} from {}", role, name, base);
        Ok(Branch::new(name.clone(), role, base))
    }

    /// The first free `name-N`.
    pub fn propose_alternative(&self, name: &BranchName) -> Result<BranchName, BranchError> {
        let existing = self.list()?;
        let proposal =
            naming::numbered_alternative(name.as_str(), |c| existing.iter().any(|b| b == c));
        Ok(BranchName::new(proposal)?)
    }

    /// Ask the operator how to get around an existing `name`.
    ///
    /// Returns `None` if the operator declines, which halts the workflow.
    /// Typed names are validated and must be free; otherwise the question
    /// is asked again with the reason.
    pub fn resolve_collision(
        &self,
        name: &BranchName,
        operator: &mut dyn Operator,
    ) -> Result<Option<BranchName>, BranchError> {
        let proposal = self.propose_alternative(name)?;
        let mut preface = format!("Branch '{}' already exists.", name);

        loop {
            let question = format!(
                "{} Use '{}' instead? (y/n, or type another name) ",
                preface, proposal
            );
            let answer = operator.ask(&question)?;
            let answer = answer.trim();

            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(proposal)),
                "" | "n" | "no" => return Ok(None),
                _ => {}
            }

            match BranchName::new(answer) {
                Ok(custom) if !self.exists(custom.as_str())? => return Ok(Some(custom)),
                Ok(custom) => preface = format!("Branch '{}' already exists too.", custom),
                Err(e) => preface = format!("That name is not usable ({}).", e),
            }
        }
    }

    /// Create and check out a branch, resolving a name collision with the
    /// operator first.
    ///
    /// Returns `None` if the operator declined to rename.
    pub fn acquire(
        &self,
        name: &BranchName,
        base: &str,
        role: BranchRole,
        operator: &mut dyn Operator,
    ) -> Result<Option<Branch>, BranchError> {
        let name = if self.exists(name.as_str())? {
            match self.resolve_collision(name, operator)? {
                Some(alternative) => alternative,
                None => return Ok(None),
            }
        } else {
            name.clone()
        };
        self.create_from(&name, base, role).map(Some)
    }

    /// Snapshot `source` as `<prefix>-<source>`, or with a timestamp suffix
    /// if that backup already exists. Does not change the checkout.
    pub fn backup(
        &self,
        source: &str,
        prefix: &str,
        at: DateTime<Utc>,
    ) -> Result<Branch, BranchError> {
        let existing = self.list()?;
        let taken = |candidate: &str| existing.iter().any(|b| b == candidate);

        let mut name = naming::backup_name(prefix, source);
        if taken(&name) {
            name = naming::timestamped_backup_name(prefix, source, at);
        }
        if taken(&name) {
            name = naming::numbered_alternative(&name, taken);
        }

        let name = BranchName::new(name)?;
        self.runner
            .run_checked(&["branch", name.as_str(), source])?;
        log::debug!("backed up {} as {}", source, name);
        Ok(Branch::new(name, BranchRole::Backup, source))
    }

    pub fn checkout(&self, name: &str) -> Result<(), BranchError> {
        self.runner.run_checked(&["checkout", name])?;
        Ok(())
    }

    /// Return to `home`, then delete each of `names` that still exists.
    ///
    /// `home` itself is never deleted.
    ///
    /// # Errors
    ///
    /// Only if listing branches or checking out `home` fails. Individual
    /// deletion failures are reported in [`CleanupReport::failed`].
    pub fn cleanup(&self, names: &[BranchName], home: &str) -> Result<CleanupReport, BranchError> {
        self.checkout(home)?;

        let existing = self.list()?;
        let mut report = CleanupReport::default();

        for name in names.iter().filter(|n| n.as_str() != home) {
            if !existing.iter().any(|b| b == name.as_str()) {
                report.missing.push(name.to_string());
                continue;
            }
            let output = self.runner.run(&["branch", "-D", name.as_str()])?;
            if output.success() {
                report.deleted.push(name.to_string());
            } else {
                log::warn!("could not delete {}: {}", name, output.diagnostic());
                report
                    .failed
                    .push((name.to_string(), output.diagnostic().to_string()));
            }
        }

        Ok(report)
    }
}
