//! Error types shared by the task store and the task manager.

use crate::task::TaskId;
use std::path::PathBuf;
use thiserror::Error;

/// Input rejected before any state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a task title.")]
    EmptyTitle,
}

/// Errors returned by task store and task manager operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    /// The snapshot exists but could not be decoded.
    #[error("Task store at {} is corrupt", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot decoded but its contents break the list's id rules.
    #[error("Task store at {} is invalid: {reason}", path.display())]
    InvalidStore { path: PathBuf, reason: String },

    #[error("Task store at {} has unsupported version {version}", path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("No task ids left")]
    IdsExhausted,

    #[error("Cannot read task store at {}", path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write task store at {}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns true when the error is a user input problem rather than a failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
