//! Dotfile link reconciliation engine.
//!
//! Reads a declarative list of dots (a source file or directory in a
//! repository plus where its symbolic link should live), links each one into
//! place, and remembers what it did in a persistent cache so later runs can
//! skip, repair, remove, or restore each dot individually.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load the configuration document and validate entries
//! - **[`cache`]**: the persistent record of every installed dot
//! - **[`resources`]**: descriptors, target resolution and filesystem probes
//! - **[`engine`]**: per-dot install / nuke / restore / status transitions
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod resources;
