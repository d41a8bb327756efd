//! CLI module for unsolvcert
//!
//! Provides command-line interface for:
//! - certify: prove the task unsolvable and write the proof directory
//! - snapshot: write only the task snapshot

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{certify, run, run_command, snapshot, Config, ExtractorKind};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
