//! CLI-specific error types
//!
//! Every CLI error ends the run. The exit code tells the caller which
//! stage failed.

use std::fmt;
use std::io;

use crate::ledger::{LedgerError, LedgerErrorCode};
use crate::task::TaskError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Task or merge-tree input rejected
    TaskError,
    /// Certificate output could not be written
    IoError,
    /// A certificate line cited something undefined or mismatched
    ReferenceError,
    /// Task uses a feature the certificate format cannot express
    UnsupportedFeature,
    /// The initial state could not be shown dead
    NotProvable,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CERT_CLI_CONFIG_ERROR",
            Self::TaskError => "CERT_CLI_TASK_ERROR",
            Self::IoError => "CERT_CLI_IO_ERROR",
            Self::ReferenceError => "CERT_CLI_REFERENCE_ERROR",
            Self::UnsupportedFeature => "CERT_CLI_UNSUPPORTED_FEATURE",
            Self::NotProvable => "CERT_CLI_NOT_PROVABLE",
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError => 2,
            Self::TaskError => 3,
            Self::IoError => 4,
            Self::ReferenceError => 5,
            Self::UnsupportedFeature => 6,
            Self::NotProvable => 7,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Initial state not covered by any dead set
    pub fn not_provable(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NotProvable, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TaskError> for CliError {
    fn from(e: TaskError) -> Self {
        Self::new(CliErrorCode::TaskError, format!("{} ({})", e, e.code()))
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        let code = match e.code() {
            LedgerErrorCode::CertIoFailed => CliErrorCode::IoError,
            LedgerErrorCode::CertReferenceUndefined | LedgerErrorCode::CertWitnessMalformed => {
                CliErrorCode::ReferenceError
            }
            LedgerErrorCode::CertUnsupportedFeature => CliErrorCode::UnsupportedFeature,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
