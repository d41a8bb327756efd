//! Errors raised while loading planning input
//!
//! Covers the task description and the merge-tree description. Both are
//! inputs produced by external collaborators; a malformed input is reported
//! once and never repaired.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for task loading and validation
pub type TaskResult<T> = Result<T, TaskError>;

/// Task input errors
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid merge tree: {0}")]
    InvalidMergeTree(String),
}

impl TaskError {
    /// Wrap an I/O failure on the given input file
    pub fn io(path: &Path, source: io::Error) -> Self {
        TaskError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Wrap a JSON decoding failure on the given input file
    pub fn parse(path: &Path, err: serde_json::Error) -> Self {
        TaskError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Short machine-readable code used in CLI responses
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Io { .. } => "CERT_TASK_IO",
            TaskError::Parse { .. } => "CERT_TASK_PARSE",
            TaskError::InvalidTask(_) => "CERT_TASK_INVALID",
            TaskError::InvalidMergeTree(_) => "CERT_MERGE_TREE_INVALID",
        }
    }
}
