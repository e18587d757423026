//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - The operator port and its terminal and scripted implementations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All operator-facing text and all questions go through this module so the
//! workflows can run against a script in tests.

pub mod output;
pub mod prompts;
