//! cli
//!
//! Command-line interface layer for forksync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Delegate to command handlers
//! - Turn a workflow outcome into a process exit code
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] workflows. It is the only layer that decides exit codes.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::process::ExitCode;

use anyhow::Result;

use crate::engine;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };
    init_logging(&ctx);

    commands::dispatch(cli.command, &ctx)
}

/// Install the `env_logger` backend. `RUST_LOG` overrides the default level.
fn init_logging(ctx: &engine::Context) {
    let default_level = if ctx.debug { "debug" } else { "warn" };
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .format_timestamp(None)
    .format_target(false)
    .try_init();

    if result.is_err() {
        log::debug!("logger already initialized");
    }
}
