//! Status sweep use case
//!
//! The sweep walks every stored event, recomputes its status from the clock
//! and persists only the rows whose stored value drifted. A failure on one
//! event is logged and the sweep continues; the scheduler driving this never
//! sees a per-event error.

use std::sync::Arc;

use convene_domain::Result;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::events::ports::EventStore;
use crate::status::compute_status;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SweepSummary {
    /// Events examined.
    pub examined: usize,
    /// Events whose stored status was corrected.
    pub updated: usize,
    /// Events whose correction failed (logged, non-fatal).
    pub failed: usize,
}

/// Reconciles stored event status with the computed value.
pub struct StatusService {
    events: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl StatusService {
    /// Create a new status service.
    pub fn new(events: Arc<dyn EventStore>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    /// Run one sweep over the whole event collection.
    ///
    /// Only events whose stored status differs from the computed one are
    /// written, so an immediately repeated run performs zero writes. The
    /// returned summary reports how much drift was found.
    pub async fn run_sweep(&self) -> Result<SweepSummary> {
        let now = self.clock.now();
        let events = self.events.list_all_events().await?;

        let mut summary = SweepSummary { examined: events.len(), ..Default::default() };
        for event in &events {
            let computed = compute_status(event.start_time, event.end_time, now);
            if computed == event.status {
                continue;
            }
            match self.events.set_event_status(event.id, computed).await {
                Ok(()) => summary.updated += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        event_id = %event.id,
                        status = %computed,
                        error = %e,
                        "Failed to persist corrected event status"
                    );
                }
            }
        }

        if summary.updated > 0 || summary.failed > 0 {
            info!(
                examined = summary.examined,
                updated = summary.updated,
                failed = summary.failed,
                "Status sweep corrected drifted events"
            );
        } else {
            debug!(examined = summary.examined, "Status sweep found no drift");
        }

        Ok(summary)
    }
}
