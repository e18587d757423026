//! forksync - keep a fork in step with its upstream
//!
//! forksync is a single-binary tool that drives two interactive workflows
//! over a forked repository: `pull` merges the upstream branch into a fresh
//! staging branch cut from the fork's home branch, and `push` copies an
//! operator-chosen subset of that staging branch onto a branch cut from
//! upstream, for review, commit and an optional push back.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates the pull and push state machines
//! - [`core`] - Domain types, naming, the directory filter, config and locking
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Operator prompts and output
//!
//! # Safety Invariants
//!
//! 1. A backup branch is created before any staging branch
//! 2. Existing branches are never overwritten; collisions go to the operator
//! 3. The home branch is never deleted
//! 4. Only the CLI decides the process exit code

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
