//! Event lifecycle service - create, edit, list and delete events

use std::sync::Arc;

use convene_domain::{
    ConveneError, Event, EventDetails, EventFilter, EventPatch, NewEvent, Page, PublicUser,
    Result, Role, User,
};
use tracing::info;
use uuid::Uuid;

use super::ports::EventStore;
use super::validation::{validate_capacity, validate_new_event, validate_text_fields, validate_window};
use crate::clock::Clock;
use crate::status::compute_status;
use crate::users::ports::UserStore;

/// Event lifecycle service
pub struct EventService {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    /// Create a new event service
    pub fn new(
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { events, users, clock }
    }

    /// Create an event on behalf of a teacher or admin.
    ///
    /// The status persisted with the new row is computed from the window at
    /// save time, never taken from the caller.
    pub async fn create_event(&self, created_by: Uuid, input: NewEvent) -> Result<EventDetails> {
        let now = self.clock.now();
        validate_new_event(&input, now)?;

        let event = Event {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            venue: input.venue,
            start_time: input.start_time,
            end_time: input.end_time,
            capacity: input.capacity,
            status: compute_status(input.start_time, input.end_time, now),
            created_by,
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.events.insert_event(&event).await?;

        info!(event_id = %event.id, created_by = %created_by, "Event created");
        resolve_event_details(self.users.as_ref(), event).await
    }

    /// Apply a partial update to an event.
    ///
    /// The time window is re-validated against the effective values (patched
    /// where present, stored otherwise) and the status is recomputed before
    /// the write so the saved row stays consistent with its window.
    pub async fn update_event(&self, id: Uuid, patch: EventPatch) -> Result<EventDetails> {
        let now = self.clock.now();
        let mut event = self
            .events
            .find_event(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;

        let start_time = patch.start_time.unwrap_or(event.start_time);
        let end_time = patch.end_time.unwrap_or(event.end_time);
        validate_window(start_time, end_time)?;

        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(venue) = patch.venue {
            event.venue = venue;
        }
        if let Some(capacity) = patch.capacity {
            validate_capacity(Some(capacity))?;
            event.capacity = Some(capacity);
        }
        validate_text_fields(&event.title, &event.description, &event.venue)?;

        event.start_time = start_time;
        event.end_time = end_time;
        event.status = compute_status(start_time, end_time, now);
        event.updated_at = now;

        self.events.update_event(&event).await?;
        info!(event_id = %event.id, "Event updated");
        resolve_event_details(self.users.as_ref(), event).await
    }

    /// Fetch one event, fully resolved, with its status computed at read time.
    pub async fn get_event(&self, id: Uuid) -> Result<EventDetails> {
        let now = self.clock.now();
        let mut event = self
            .events
            .find_event(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        event.status = compute_status(event.start_time, event.end_time, now);
        resolve_event_details(self.users.as_ref(), event).await
    }

    /// List events; the status on every returned event is the computed one.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Page<Event>> {
        let now = self.clock.now();
        let mut page = self.events.list_events(filter, now).await?;
        for event in &mut page.items {
            event.status = compute_status(event.start_time, event.end_time, now);
        }
        Ok(page)
    }

    /// Delete an event and cascade-remove it from every attendee's record.
    ///
    /// Admins may delete any event; teachers only their own.
    pub async fn delete_event(&self, id: Uuid, requester: &User) -> Result<()> {
        let event = self
            .events
            .find_event(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;

        if requester.role != Role::Admin && event.created_by != requester.id {
            return Err(ConveneError::Forbidden(
                "Only the event owner or an admin can delete this event".to_string(),
            ));
        }

        self.events.delete_event(id).await?;
        info!(event_id = %id, deleted_by = %requester.id, "Event deleted");
        Ok(())
    }

    /// Attendee list for an event, restricted to its owner or an admin.
    pub async fn event_attendees(&self, id: Uuid, requester: &User) -> Result<Vec<PublicUser>> {
        let event = self
            .events
            .find_event(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;

        if requester.role != Role::Admin && event.created_by != requester.id {
            return Err(ConveneError::Forbidden(
                "Only the event owner or an admin can view attendees".to_string(),
            ));
        }

        let users = self.users.find_users(&event.attendees).await?;
        Ok(users.iter().map(User::to_public).collect())
    }
}

/// Expand an event to display form: creator and attendees as public profiles.
///
/// Attendee order follows the event's insertion order even though the store
/// may return the user rows in any order.
pub(crate) async fn resolve_event_details(
    users: &dyn UserStore,
    event: Event,
) -> Result<EventDetails> {
    let creator = users
        .find_user(event.created_by)
        .await?
        .ok_or_else(|| ConveneError::Internal("Event creator missing from store".to_string()))?;

    let profiles = users.find_users(&event.attendees).await?;
    let attendees = event
        .attendees
        .iter()
        .filter_map(|id| profiles.iter().find(|u| u.id == *id))
        .map(User::to_public)
        .collect();

    Ok(EventDetails {
        id: event.id,
        title: event.title,
        description: event.description,
        venue: event.venue,
        start_time: event.start_time,
        end_time: event.end_time,
        capacity: event.capacity,
        status: event.status,
        created_by: creator.to_public(),
        attendees,
        created_at: event.created_at,
        updated_at: event.updated_at,
    })
}
