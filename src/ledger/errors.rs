//! Ledger error types
//!
//! Error codes:
//! - CERT_IO_FAILED (FATAL severity)
//! - CERT_REFERENCE_UNDEFINED (FATAL severity)
//! - CERT_UNSUPPORTED_FEATURE (FATAL severity)
//! - CERT_WITNESS_MALFORMED (ERROR severity)

use std::fmt;
use std::io;
use std::path::Path;

/// Severity levels for ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the run may continue
    Error,
    /// The run must abort and discard its output
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Ledger error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorCode {
    /// Certificate output could not be written
    CertIoFailed,
    /// A line cites a set or knowledge id that is not defined yet
    CertReferenceUndefined,
    /// The task uses a feature the snapshot format cannot express
    CertUnsupportedFeature,
    /// A witness hex string does not decode to a state
    CertWitnessMalformed,
}

impl LedgerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerErrorCode::CertIoFailed => "CERT_IO_FAILED",
            LedgerErrorCode::CertReferenceUndefined => "CERT_REFERENCE_UNDEFINED",
            LedgerErrorCode::CertUnsupportedFeature => "CERT_UNSUPPORTED_FEATURE",
            LedgerErrorCode::CertWitnessMalformed => "CERT_WITNESS_MALFORMED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LedgerErrorCode::CertIoFailed => Severity::Fatal,
            LedgerErrorCode::CertReferenceUndefined => Severity::Fatal,
            LedgerErrorCode::CertUnsupportedFeature => Severity::Fatal,
            LedgerErrorCode::CertWitnessMalformed => Severity::Error,
        }
    }
}

impl fmt::Display for LedgerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ledger error with context
#[derive(Debug)]
pub struct LedgerError {
    code: LedgerErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl LedgerError {
    /// Output file could not be created, written or synced
    pub fn io_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: LedgerErrorCode::CertIoFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// I/O failure on a specific path
    pub fn io_failed_at(action: &str, path: &Path, source: io::Error) -> Self {
        Self {
            code: LedgerErrorCode::CertIoFailed,
            message: format!("Failed to {}", action),
            details: Some(format!("path: {}", path.display())),
            source: Some(source),
        }
    }

    /// Undefined set id cited by `line`
    pub fn undefined_set(id: usize, line: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::CertReferenceUndefined,
            message: format!("set {} is not defined", id),
            details: Some(format!("line: {}", line.into())),
            source: None,
        }
    }

    /// Undefined knowledge id cited by `line`
    pub fn undefined_knowledge(id: usize, line: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::CertReferenceUndefined,
            message: format!("knowledge {} is not defined", id),
            details: Some(format!("line: {}", line.into())),
            source: None,
        }
    }

    /// Justification that does not fit its statement
    pub fn invalid_justification(reason: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::CertReferenceUndefined,
            message: reason.into(),
            details: Some(format!("line: {}", line.into())),
            source: None,
        }
    }

    pub fn unsupported_feature(message: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::CertUnsupportedFeature,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn witness_malformed(message: impl Into<String>) -> Self {
        Self {
            code: LedgerErrorCode::CertWitnessMalformed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn code(&self) -> LedgerErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the run must abort
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
