//! Clock abstraction.
//!
//! Services never read the system time directly; they hold a [`Clock`] so
//! tests can pin the current instant and move it deliberately instead of
//! waiting real minutes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
///
/// `Send + Sync + 'static` so implementations can sit behind
/// `Arc<dyn Clock>` inside services and spawned tasks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock pinned to an explicit instant.
///
/// Clones share the underlying instant, so a test can hand one handle to a
/// service and keep another to move time as the scenario unfolds.
#[derive(Debug, Clone)]
pub struct MockClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// A clock frozen at `start` until told otherwise.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self { instant: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.update(|instant| *instant += delta);
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.update(|instant| *instant = to);
    }

    fn update(&self, apply: impl FnOnce(&mut DateTime<Utc>)) {
        let mut guard = match self.instant.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        apply(&mut guard);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
