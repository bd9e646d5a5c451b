//! Error types for wordoink.
//!
//! All errors are strongly typed using thiserror. A rejected word is not an
//! error: it is reported through [`crate::stem::StemOutcome::Rejected`].

use thiserror::Error;

use crate::job::{JobId, JobState};

pub use crate::storage::StorageError;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Key does not follow `//resource-name/user-context/user-key`.
    #[error("Invalid message key '{key}': {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration value out of range.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },
}

/// Execution errors that occur while running jobs.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// No job with this id was ever submitted.
    #[error("Job not found: {id}")]
    JobNotFound {
        /// Requested job id.
        id: JobId,
    },

    /// A lifecycle step was attempted from the wrong state.
    #[error("Cannot '{action}' a job in state '{state}'")]
    InvalidJobTransition {
        /// Attempted step, e.g. `process`.
        action: &'static str,
        /// State the job was in.
        state: JobState,
    },
}

/// Top-level error type for wordoink.
#[derive(Debug, Error)]
pub enum WordoinkError {
    /// Bad input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Job lifecycle failure.
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Reading configuration failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken internal invariant.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl WordoinkError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for wordoink operations.
pub type WordoinkResult<T> = Result<T, WordoinkError>;
