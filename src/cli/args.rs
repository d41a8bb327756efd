//! CLI argument definitions using clap
//!
//! Commands:
//! - unsolvcert certify --config <path>
//! - unsolvcert snapshot --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// unsolvcert - unsolvability certificates for classical planning tasks
#[derive(Parser, Debug)]
#[command(name = "unsolvcert")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prove the task unsolvable and write the certificate
    Certify {
        /// Path to configuration file
        #[arg(long, default_value = "./unsolvcert.json")]
        config: PathBuf,
    },

    /// Write only the task snapshot
    Snapshot {
        /// Path to configuration file
        #[arg(long, default_value = "./unsolvcert.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
