//! unsolvcert CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments (via cli::run)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Reports errors on stderr and as a JSON error response
//! 4. Exits with the error's exit code on failure
//!
//! All logic is delegated to the CLI module.

use unsolvcert::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        let _ = cli::write_error(e.code_str(), e.message());
        std::process::exit(e.exit_code());
    }
}
