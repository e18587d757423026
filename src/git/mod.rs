//! git
//!
//! Everything that talks to Git.
//!
//! # Architecture
//!
//! Git is an external collaborator reached only through the
//! [`CommandRunner`] trait. The higher layers never spawn processes; they
//! ask a runner, which makes every workflow step testable against a
//! scripted runner or a throwaway repository.
//!
//! # Modules
//!
//! - `interface` - [`CommandRunner`], the production [`GitCli`], repository discovery
//! - [`classify`] - Marker tables for conflicts and missing paths
//! - [`branches`] - Branch manager: create, collide, back up, clean up
//! - [`diff`] - Change-set resolver
//!
//! # Invariants
//!
//! - No module outside `git` runs the git binary
//! - `git2` is used only for repository discovery

pub mod branches;
pub mod classify;
pub mod diff;
mod interface;

#[cfg(test)]
pub(crate) use interface::fake;
pub use interface::{
    discover, CommandOutput, CommandRunner, ExitStatusText, GitCli, GitError, RepoInfo,
};
