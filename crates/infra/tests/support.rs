//! Shared fixtures for infrastructure integration tests.

// Each test binary compiles this module separately and uses its own subset.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use convene_domain::{Event, EventStatus, Role, User};
use convene_infra::database::DbManager;
use tempfile::TempDir;
use uuid::Uuid;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("convene-test.db");

        let manager =
            Arc::new(DbManager::new(&db_path, 4).expect("db manager should be created"));
        manager.run_migrations().expect("migrations should apply");

        Self { manager, _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed reference instant so window arithmetic stays readable.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 7, 12, 0, 0).single().expect("valid timestamp")
}

/// User fixture; the email is derived from the name.
pub fn make_user(name: &str, role: Role) -> User {
    let now = reference_time() - Duration::days(30);
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

/// Event fixture with an explicit window and stored status.
pub fn make_event(
    created_by: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    capacity: Option<u32>,
    stored_status: EventStatus,
) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: "Spring lecture".to_string(),
        description: "Guest lecture on materials science".to_string(),
        venue: "Auditorium B".to_string(),
        start_time: start,
        end_time: end,
        capacity,
        status: stored_status,
        created_by,
        attendees: Vec::new(),
        created_at: reference_time() - Duration::days(1),
        updated_at: reference_time() - Duration::days(1),
    }
}

/// Event fixture two hours ahead of the reference time.
pub fn upcoming_event(created_by: Uuid, capacity: Option<u32>) -> Event {
    let start = reference_time() + Duration::hours(2);
    make_event(created_by, start, start + Duration::hours(2), capacity, EventStatus::Upcoming)
}
