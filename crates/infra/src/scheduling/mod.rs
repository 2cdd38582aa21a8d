//! Background task scheduling.
//!
//! One scheduler lives here: the status sweep, which periodically reconciles
//! every event's stored status with the value computed from the clock. The
//! owner drives its lifecycle explicitly through `start` and `stop`;
//! dropping the scheduler cancels whatever is still running.

pub mod error;
pub mod status_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use status_scheduler::{StatusSweepScheduler, StatusSweepSchedulerConfig};
