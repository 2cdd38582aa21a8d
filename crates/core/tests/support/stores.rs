//! In-memory store implementing the core ports for testing
//!
//! The store honours the same contract as the SQLite repositories: every
//! registration mutation runs its precondition checks and both-side writes
//! under one lock, so concurrent callers observe the same linearizable
//! behaviour the real store provides per event.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convene_core::events::ports::EventStore;
use convene_core::registration::rules;
use convene_core::users::ports::UserStore;
use convene_core::compute_status;
use convene_domain::{
    ConveneError, Event, EventFilter, EventStatus, Page, Result, User, UserFilter,
};
use convene_domain::constants::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

#[derive(Default)]
struct StoreState {
    events: Vec<Event>,
    users: Vec<User>,
}

/// In-memory mock for [`EventStore`] and [`UserStore`].
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    /// Event ids whose status writes should fail, for sweep failure tests.
    failing_status_writes: Mutex<HashSet<Uuid>>,
    /// Number of status writes attempted, for sweep idempotence tests.
    status_writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user directly, bypassing service validation.
    pub fn seed_user(&self, user: User) {
        self.state.lock().unwrap().users.push(user);
    }

    /// Seed an event directly, bypassing service validation.
    pub fn seed_event(&self, event: Event) {
        self.state.lock().unwrap().events.push(event);
    }

    /// Make future status writes for `event_id` fail with a database error.
    pub fn fail_status_writes_for(&self, event_id: Uuid) {
        self.failing_status_writes.lock().unwrap().insert(event_id);
    }

    pub fn status_write_count(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    pub fn get_event(&self, id: Uuid) -> Option<Event> {
        self.state.lock().unwrap().events.iter().find(|e| e.id == id).cloned()
    }

    pub fn get_user(&self, id: Uuid) -> Option<User> {
        self.state.lock().unwrap().users.iter().find(|u| u.id == id).cloned()
    }

    pub fn all_events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn all_users(&self) -> Vec<User> {
        self.state.lock().unwrap().users.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.get_event(id))
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        self.state.lock().unwrap().events.push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        let attendees = stored.attendees.clone();
        *stored = event.clone();
        stored.attendees = attendees;
        Ok(())
    }

    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<()> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        if self.failing_status_writes.lock().unwrap().contains(&id) {
            return Err(ConveneError::Database("simulated status write failure".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        let stored = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        stored.status = status;
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Page<Event>> {
        let state = self.state.lock().unwrap();
        let mut matches: Vec<Event> = state
            .events
            .iter()
            .filter(|e| {
                filter.status.map_or(true, |wanted| {
                    compute_status(e.start_time, e.end_time, now) == wanted
                })
            })
            .filter(|e| {
                filter.search.as_ref().map_or(true, |term| {
                    let term = term.to_lowercase();
                    e.title.to_lowercase().contains(&term)
                        || e.description.to_lowercase().contains(&term)
                        || e.venue.to_lowercase().contains(&term)
                })
            })
            .filter(|e| filter.created_by.map_or(true, |creator| e.created_by == creator))
            .cloned()
            .collect();
        matches.sort_by_key(|e| e.start_time);

        let total = matches.len() as u64;
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let offset = ((page - 1) * per_page) as usize;
        let items: Vec<Event> =
            matches.into_iter().skip(offset).take(per_page as usize).collect();
        Ok(Page::new(items, total, page, per_page))
    }

    async fn list_all_events(&self) -> Result<Vec<Event>> {
        Ok(self.all_events())
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.events.len();
        state.events.retain(|e| e.id != id);
        if state.events.len() == before {
            return Err(ConveneError::NotFound("Event not found".to_string()));
        }
        for user in &mut state.users {
            user.events_attended.retain(|attended| *attended != id);
        }
        Ok(())
    }

    async fn register_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let mut state = self.state.lock().unwrap();
        let event = state
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        rules::check_register(&event, user_id, now)?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ConveneError::NotFound("User not found".to_string()))?;
        user.events_attended.push(event_id);
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        event.attendees.push(user_id);
        event.updated_at = now;
        Ok(event.clone())
    }

    async fn unregister_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let mut state = self.state.lock().unwrap();
        let event = state
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        rules::check_unregister(&event, user_id, now)?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ConveneError::NotFound("User not found".to_string()))?;
        user.events_attended.retain(|attended| *attended != event_id);
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
        event.attendees.retain(|attendee| *attendee != user_id);
        event.updated_at = now;
        Ok(event.clone())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.get_user(id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(ConveneError::EmailTaken(user.email.clone()));
        }
        state.users.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| ConveneError::NotFound("User not found".to_string()))?;
        let attended = stored.events_attended.clone();
        *stored = user.clone();
        stored.events_attended = attended;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(ConveneError::NotFound("User not found".to_string()));
        }
        // Registrations go with the user, and so do events they created.
        let owned: Vec<Uuid> =
            state.events.iter().filter(|e| e.created_by == id).map(|e| e.id).collect();
        state.events.retain(|e| e.created_by != id);
        for event in &mut state.events {
            event.attendees.retain(|attendee| *attendee != id);
        }
        for user in &mut state.users {
            user.events_attended.retain(|attended| !owned.contains(attended));
        }
        Ok(())
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Page<User>> {
        let state = self.state.lock().unwrap();
        let mut matches: Vec<User> = state
            .users
            .iter()
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .filter(|u| {
                filter.search.as_ref().map_or(true, |term| {
                    let term = term.to_lowercase();
                    u.name.to_lowercase().contains(&term)
                        || u.email.to_lowercase().contains(&term)
                })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matches.len() as u64;
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let offset = ((page - 1) * per_page) as usize;
        let items: Vec<User> =
            matches.into_iter().skip(offset).take(per_page as usize).collect();
        Ok(Page::new(items, total, page, per_page))
    }
}
