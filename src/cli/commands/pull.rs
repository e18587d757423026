//! cli::commands::pull
//!
//! Merge upstream into a fresh staging branch.
//!
//! # Example
//!
//! ```bash
//! forksync pull
//! ```

use std::process::ExitCode;

use anyhow::Result;

use super::{finish, Workspace};
use crate::engine::{run_pull, Context, Session};
use crate::ui::prompts::TerminalOperator;

/// Run the pull command.
pub fn pull(ctx: &Context) -> Result<ExitCode> {
    let workspace = Workspace::open(ctx)?;
    let mut operator = TerminalOperator::stdio();
    let mut session = Session::new(
        &workspace.git,
        &mut operator,
        &workspace.config,
        ctx.verbosity(),
    );

    let run = run_pull(&mut session)?;
    Ok(finish(&run, ctx))
}
