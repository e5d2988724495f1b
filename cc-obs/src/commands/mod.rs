//! Subcommand implementations.
//!
//! Each `run` returns the process exit code; errors that should abort with a
//! message are returned as `anyhow::Error`.

pub mod clear;
pub mod helpers;
pub mod install;
pub mod log;
pub mod prompt;
pub mod status;
pub mod wrap;
pub mod wrap_agent;
