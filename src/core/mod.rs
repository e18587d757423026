//! core
//!
//! Domain types and pure logic: no process spawning, no prompting.
//!
//! # Modules
//!
//! - [`types`] - Branch names, change entries and change-sets
//! - [`naming`] - Collision alternatives, backup and feature branch names
//! - [`filter`] - Directory index and the include/exclude range grammar
//! - [`config`] - Configuration schema and layered loading
//! - [`paths`] - Where forksync keeps its files inside `.git`
//! - [`lock`] - Single-operator repository lock

pub mod config;
pub mod filter;
pub mod lock;
pub mod naming;
pub mod paths;
pub mod types;
