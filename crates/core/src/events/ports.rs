//! Port interfaces for event persistence
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations. Registration mutations are exposed
//! as whole operations because the precondition checks and the write must
//! share one isolated unit of work; implementations apply
//! [`crate::registration::rules`] inside that unit of work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convene_domain::{Event, EventFilter, EventStatus, Page, Result};
use uuid::Uuid;

/// Trait for event persistence and retrieval
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Get an event by id, attendees included in insertion order
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;

    /// Persist a new event
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Persist edits to an event's own fields (not its attendee set)
    async fn update_event(&self, event: &Event) -> Result<()>;

    /// Overwrite the cached status of a single event
    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<()>;

    /// List events matching a filter, ordered by ascending start time.
    ///
    /// A status filter matches against the status computed at `now`, not the
    /// stored column.
    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Page<Event>>;

    /// Every stored event, for the status sweep
    async fn list_all_events(&self) -> Result<Vec<Event>>;

    /// Delete an event and every registration pointing at it, atomically.
    ///
    /// Returns `NotFound` when the event does not exist.
    async fn delete_event(&self, id: Uuid) -> Result<()>;

    /// Atomically add a user to an event's attendee set.
    ///
    /// The whole read-check-write sequence runs in one isolated unit of work:
    /// the event is read, the registration preconditions are checked in order
    /// (missing event → `NotFound`, computed status not upcoming →
    /// `InvalidState`, full → `CapacityExceeded`, duplicate →
    /// `AlreadyRegistered`, missing user → `NotFound`), and on success both
    /// the event's attendee set and the user's attended set change together.
    /// Returns the updated event.
    async fn register_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event>;

    /// Atomically remove a user from an event's attendee set.
    ///
    /// Mirror of [`Self::register_attendee`]: same isolation, preconditions
    /// checked in order (missing event → `NotFound`, computed status not
    /// upcoming → `InvalidState`, not a member → `NotRegistered`). Returns
    /// the updated event.
    async fn unregister_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event>;
}
