//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// forksync - keep a fork in step with its upstream, one reviewed batch at a time
#[derive(Parser, Debug)]
#[command(name = "forksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if forksync was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; prompts and errors are still shown
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Merge upstream into a fresh staging branch cut from your home branch
    #[command(
        name = "pull",
        long_about = "Merge upstream into a fresh staging branch cut from your home branch.\n\n\
            The working tree must be clean. Your home branch is backed up first, then a \
            staging branch is created from it and the upstream branch is merged in. If \
            the merge stops on conflicts, resolve and commit them on the staging branch \
            before running push.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bring upstream changes into pull-from-upstream
    forksync pull

    # Same, for a repository elsewhere
    forksync --cwd ../my-fork pull

CONFIGURATION:
    Branch and remote names come from forksync's config.toml.
    Defaults: home 'dev', remote 'upstream', branch 'main'."
    )]
    Pull,

    /// Copy selected changes from the staging branch onto upstream and push them
    #[command(
        name = "push",
        long_about = "Copy selected changes from the staging branch onto upstream and push \
            them.\n\n\
            A push branch is cut from the upstream branch. You choose which changed \
            directories to copy, review and commit the result yourself, and then decide \
            whether to push it to a new feature branch or straight to the upstream branch. \
            Repeat for as many batches as you like; temporary branches can be cleaned up \
            at the end.",
        after_help = "\
FILTER EXPRESSIONS:
    1,3        directories 1 and 3
    2-5        directories 2 through 5
    !4         everything except directory 4
    1-5,!3     1 through 5, but not 3

    Only files directly inside a chosen directory are selected;
    subdirectories are listed and chosen separately."
    )]
    Push,
}
