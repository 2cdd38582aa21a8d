//! Registration coordinator - all-or-nothing membership changes
//!
//! The store performs the isolated read-check-write (see
//! [`crate::events::ports::EventStore::register_attendee`]); this service
//! owns the clock, the logging and the expansion of the result to display
//! form.

use std::sync::Arc;

use convene_domain::{EventDetails, Result};
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::events::ports::EventStore;
use crate::events::service::resolve_event_details;
use crate::users::ports::UserStore;

/// Coordinates event/user membership changes
pub struct RegistrationService {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Create a new registration service
    pub fn new(
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { events, users, clock }
    }

    /// Register a user for an event.
    ///
    /// Succeeds only when the event exists, is still upcoming by computed
    /// status, has a free slot and does not already contain the user; the
    /// attendee append and the user's attended-events append commit together.
    pub async fn register(&self, event_id: Uuid, user_id: Uuid) -> Result<EventDetails> {
        let now = self.clock.now();
        let event = self.events.register_attendee(event_id, user_id, now).await?;
        info!(event_id = %event_id, user_id = %user_id, "User registered for event");
        resolve_event_details(self.users.as_ref(), event).await
    }

    /// Withdraw a user from an event, mirroring [`Self::register`].
    pub async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<EventDetails> {
        let now = self.clock.now();
        let event = self.events.unregister_attendee(event_id, user_id, now).await?;
        info!(event_id = %event_id, user_id = %user_id, "User unregistered from event");
        resolve_event_details(self.users.as_ref(), event).await
    }
}
