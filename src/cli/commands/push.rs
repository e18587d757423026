//! cli::commands::push
//!
//! Copy selected changes from the staging branch onto upstream.
//!
//! # Example
//!
//! ```bash
//! # after a successful `forksync pull`
//! forksync push
//! ```

use std::process::ExitCode;

use anyhow::Result;

use super::{finish, Workspace};
use crate::engine::{run_push, Context, Session};
use crate::ui::prompts::TerminalOperator;

/// Run the push command.
pub fn push(ctx: &Context) -> Result<ExitCode> {
    let workspace = Workspace::open(ctx)?;
    let mut operator = TerminalOperator::stdio();
    let mut session = Session::new(
        &workspace.git,
        &mut operator,
        &workspace.config,
        ctx.verbosity(),
    );

    let run = run_push(&mut session)?;
    Ok(finish(&run, ctx))
}
