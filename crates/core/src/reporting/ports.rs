//! Port interface for reporting aggregates
//!
//! Counting and grouping stay close to the data; the store answers the
//! aggregate questions, the service shapes them into dashboard responses.
//! Wherever a count depends on event status, the store must bucket by the
//! status computed at `now` (same boundaries as
//! [`crate::status::compute_status`]), not by the stored column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convene_domain::{AttendanceRow, Event, Result, RoleCounts, StatusCounts};
use uuid::Uuid;

/// Trait for reporting aggregates over the store
#[async_trait]
pub trait ReportingStore: Send + Sync {
    /// User counts per role
    async fn count_users_by_role(&self) -> Result<RoleCounts>;

    /// Event counts per status computed at `now`, optionally scoped to one
    /// creator
    async fn count_events_by_status(
        &self,
        now: DateTime<Utc>,
        created_by: Option<Uuid>,
    ) -> Result<StatusCounts>;

    /// Events created inside `[start, end)`, optionally scoped to one creator
    async fn count_events_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        created_by: Option<Uuid>,
    ) -> Result<u64>;

    /// Registrations recorded inside `[start, end)`
    async fn count_registrations_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64>;

    /// Registrations recorded inside `[start, end)`, bucketed by the
    /// registrant's role
    async fn registrations_by_role_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RoleCounts>;

    /// Total attendee count across events, optionally scoped to one creator
    async fn total_attendees(&self, created_by: Option<Uuid>) -> Result<u64>;

    /// Most recently created events for one creator
    async fn recent_events(&self, created_by: Uuid, limit: u32) -> Result<Vec<Event>>;

    /// One attendance row per event, ordered by start time
    async fn attendance_rows(&self) -> Result<Vec<AttendanceRow>>;
}
