//! Failure modes of the background scheduler.

use std::time::Duration;

use convene_domain::ConveneError;
use thiserror::Error;
use tokio::time::error::Elapsed;

use crate::errors::InfraError;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors surfaced by the scheduler lifecycle calls.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called while a sweep task is live.
    #[error("sweep task is already running")]
    AlreadyRunning,

    /// `stop` was called with no task to stop.
    #[error("no sweep task is running")]
    NotRunning,

    /// The task ignored cancellation past the grace period.
    #[error("sweep task did not stop within {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: Elapsed,
    },

    /// The task panicked or was aborted.
    #[error("sweep task join failed: {0}")]
    JoinFailed(#[from] tokio::task::JoinError),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        // Lifecycle misuse is a state problem the caller can recover from;
        // everything else is internal.
        let mapped = match &err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                ConveneError::InvalidState(err.to_string())
            }
            SchedulerError::Timeout { .. } | SchedulerError::JoinFailed(_) => {
                ConveneError::Internal(err.to_string())
            }
        };
        InfraError(mapped)
    }
}

impl From<SchedulerError> for ConveneError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}
