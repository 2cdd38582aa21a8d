//! Shared test helpers for `convene-core` integration tests.
//!
//! These helpers provide reusable fixtures and an in-memory store so the
//! service tests can focus on behaviour instead of boilerplate.

// Each test binary compiles this module separately and uses its own subset.
#![allow(dead_code)]

pub mod stores;

use chrono::{DateTime, Duration, TimeZone, Utc};
use convene_domain::{Event, EventStatus, Role, User};
use uuid::Uuid;

/// A fixed reference instant so tests are independent of the wall clock.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 7, 12, 0, 0).single().unwrap()
}

pub fn sample_user(name: &str, role: Role) -> User {
    let now = reference_time();
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
        password_hash: "salt$hash".to_string(),
        role,
        events_attended: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// An event whose stored status matches the given value, regardless of what
/// the window implies; tests that need staleness rely on that.
pub fn sample_event(
    created_by: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    capacity: Option<u32>,
    stored_status: EventStatus,
) -> Event {
    let now = reference_time();
    Event {
        id: Uuid::new_v4(),
        title: "Spring lecture".to_string(),
        description: "Guest speaker session".to_string(),
        venue: "Auditorium B".to_string(),
        start_time,
        end_time,
        capacity,
        status: stored_status,
        created_by,
        attendees: Vec::new(),
        created_at: now - Duration::days(1),
        updated_at: now - Duration::days(1),
    }
}

/// An event that is upcoming relative to [`reference_time`].
pub fn upcoming_event(created_by: Uuid, capacity: Option<u32>) -> Event {
    let start = reference_time() + Duration::hours(2);
    sample_event(created_by, start, start + Duration::hours(2), capacity, EventStatus::Upcoming)
}
