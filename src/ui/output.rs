//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Operator-facing text goes through here and respects the quiet flag.
//! Errors are always shown. A menu that a prompt refers to is written as
//! part of the prompt itself, so quiet mode never hides it. Diagnostic
//! detail for debugging goes to the `log` facade instead.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    #[default]
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a step heading, set off by a blank line.
pub fn heading(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("\n{}", message);
    }
}

/// Print guidance about the next manual step. Shown even in quiet mode.
pub fn note(message: impl Display) {
    println!("note: {}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a 1-based numbered list.
pub fn format_numbered<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}: {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}
