//! Job identity and lifecycle.
//!
//! Every submitted message becomes a [`Job`] that moves through
//! `Created -> Queued -> Processing -> Complete | Error`. Any other step is
//! refused with [`ExecutionError::InvalidJobTransition`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::key::MessageKey;

/// Unique identifier for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Creates a new random job ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a job ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Built but not yet enqueued.
    Created,
    /// Waiting in the queue.
    Queued,
    /// Picked up by the processor.
    Processing,
    /// Finished without error.
    Complete,
    /// Failed; `status` holds the reason.
    Error,
}

impl JobState {
    /// True for `Complete` and `Error`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
            Self::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Kind of behavior a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Word decomposition.
    Stem,
    /// Occurrence recording on a stem.
    Persist,
    /// Record removal.
    Delete,
}

/// A unit of work tracked by the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Stable identity, returned on submit.
    pub id: JobId,
    /// Message the job runs against.
    pub key: MessageKey,
    /// Behavior the job runs.
    pub kind: BehaviorKind,
    /// Times the job entered `Processing`.
    pub tries: u32,
    /// Current lifecycle state.
    pub state: JobState,
    /// Free-text outcome: why a job halted or failed.
    pub status: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// Last state change.
    pub modified_at: DateTime<Utc>,
}

impl Job {
    /// Creates a job in `Created` state.
    #[must_use]
    pub fn new(key: MessageKey, kind: BehaviorKind) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            key,
            kind,
            tries: 0,
            state: JobState::Created,
            status: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// `Created -> Queued`.
    ///
    /// # Errors
    /// Returns [`ExecutionError::InvalidJobTransition`] from any other state.
    pub fn queue(&mut self) -> Result<(), ExecutionError> {
        self.check_and_set(JobState::Queued, JobState::Created, "queue")
    }

    /// `Queued -> Processing`, counting one more try.
    ///
    /// # Errors
    /// Returns [`ExecutionError::InvalidJobTransition`] from any other state.
    pub fn start(&mut self) -> Result<(), ExecutionError> {
        self.check_and_set(JobState::Processing, JobState::Queued, "process")?;
        self.tries = self.tries.saturating_add(1);
        Ok(())
    }

    /// `Processing -> Complete`.
    ///
    /// # Errors
    /// Returns [`ExecutionError::InvalidJobTransition`] from any other state.
    pub fn complete(&mut self) -> Result<(), ExecutionError> {
        self.check_and_set(JobState::Complete, JobState::Processing, "complete")
    }

    /// `Processing -> Error`, recording `reason` as the status.
    ///
    /// # Errors
    /// Returns [`ExecutionError::InvalidJobTransition`] from any other state.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ExecutionError> {
        self.check_and_set(JobState::Error, JobState::Processing, "error")?;
        self.status = Some(reason.into());
        Ok(())
    }

    fn check_and_set(
        &mut self,
        to: JobState,
        from: JobState,
        action: &'static str,
    ) -> Result<(), ExecutionError> {
        if self.state != from {
            return Err(ExecutionError::InvalidJobTransition {
                action,
                state: self.state,
            });
        }
        self.state = to;
        let now = Utc::now();
        if now > self.modified_at {
            self.modified_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        Job::new(MessageKey::parse("//s3/wordoink/cat").unwrap(), BehaviorKind::Stem)
    }

    #[test]
    fn test_new_job() {
        let job = job();
        assert_eq!(job.state, JobState::Created);
        assert_eq!(job.tries, 0);
        assert!(job.status.is_none());
        assert!(!job.id.as_uuid().is_nil());
    }

    #[test]
    fn test_happy_path() {
        let mut job = job();
        job.queue().unwrap();
        job.start().unwrap();
        assert_eq!(job.tries, 1);
        job.complete().unwrap();
        assert_eq!(job.state, JobState::Complete);
        assert!(job.state.is_terminal());
    }

    #[test]
    fn test_error_records_reason() {
        let mut job = job();
        job.queue().unwrap();
        job.start().unwrap();
        job.fail("store unavailable").unwrap();
        assert_eq!(job.state, JobState::Error);
        assert_eq!(job.status.as_deref(), Some("store unavailable"));
    }

    #[test]
    fn test_out_of_order_transitions() {
        let mut job = job();
        let err = job.start().unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::InvalidJobTransition {
                action: "process",
                state: JobState::Created
            }
        ));
        assert!(job.complete().is_err());
        assert!(job.fail("x").is_err());

        job.queue().unwrap();
        assert!(job.queue().is_err());
        assert_eq!(job.state, JobState::Queued);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_serde_round_trip() {
        let job = job();
        let encoded = serde_json::to_value(&job).unwrap();
        assert_eq!(encoded["kind"], "stem");
        assert_eq!(encoded["key"], "//s3/wordoink/cat");
        let decoded: Job = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, job);
    }
}
