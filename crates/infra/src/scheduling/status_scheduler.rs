//! Periodic status sweep scheduler.
//!
//! Drives the status sweep on a fixed interval. One sweep runs immediately
//! on start so a fresh process corrects drift accumulated while it was
//! down, then the interval loop takes over. Sweep failures are logged and
//! never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use convene_core::StatusService;
use convene_domain::constants::DEFAULT_SWEEP_INTERVAL_SECS;
use convene_shared::config::SweepConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// How long `stop` waits for the sweep task to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Sweep cadence settings.
#[derive(Debug, Clone)]
pub struct StatusSweepSchedulerConfig {
    /// Gap between the end of one pass and the start of the next.
    pub interval: Duration,
}

impl Default for StatusSweepSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS) }
    }
}

impl From<&SweepConfig> for StatusSweepSchedulerConfig {
    fn from(config: &SweepConfig) -> Self {
        // Zero would make the loop spin; hold it at one second.
        Self { interval: Duration::from_secs(config.interval_seconds.max(1)) }
    }
}

/// Owns the background task that keeps stored event statuses in line with
/// the clock.
///
/// `start` spawns the task and `stop` joins it; both take `&mut self`, so
/// lifecycle calls cannot race. A stopped scheduler may be started again.
pub struct StatusSweepScheduler {
    service: Arc<StatusService>,
    config: StatusSweepSchedulerConfig,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StatusSweepScheduler {
    pub fn new(service: Arc<StatusService>, config: StatusSweepSchedulerConfig) -> Self {
        Self { service, config, cancel: CancellationToken::new(), task: None }
    }

    /// Spawn the sweep task.
    ///
    /// The first pass runs as soon as the task is up; later passes follow
    /// the configured interval.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::AlreadyRunning`] when a sweep task is already live.
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Tokens are single-use; each run gets a fresh one.
        self.cancel = CancellationToken::new();
        let task =
            sweep_task(Arc::clone(&self.service), self.config.interval, self.cancel.clone());
        self.task = Some(tokio::spawn(task));

        info!(interval_secs = self.config.interval.as_secs(), "status sweep scheduler started");
        Ok(())
    }

    /// Cancel the sweep task and wait for it to finish.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] when there is nothing to stop, and
    /// [`SchedulerError::Timeout`] when the task ignores cancellation for
    /// longer than the shutdown grace period.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let task = self.task.take().ok_or(SchedulerError::NotRunning)?;
        self.cancel.cancel();

        tokio::time::timeout(SHUTDOWN_GRACE, task)
            .await
            .map_err(|source| SchedulerError::Timeout { duration: SHUTDOWN_GRACE, source })??;

        info!("status sweep scheduler stopped");
        Ok(())
    }

    /// Whether a sweep task is live right now.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for StatusSweepScheduler {
    fn drop(&mut self) {
        // Nobody is left to call stop; tell the task to wind down on its own.
        self.cancel.cancel();
    }
}

/// Body of the spawned task: sweep, then wait out the interval or a
/// cancellation, whichever comes first.
async fn sweep_task(service: Arc<StatusService>, interval: Duration, cancel: CancellationToken) {
    loop {
        match service.run_sweep().await {
            Ok(summary) => debug!(
                examined = summary.examined,
                updated = summary.updated,
                failed = summary.failed,
                "status sweep pass finished"
            ),
            Err(err) => error!(error = %err, "status sweep pass failed"),
        }

        tokio::select! {
            () = cancel.cancelled() => {
                debug!("status sweep task cancelled");
                break;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}
