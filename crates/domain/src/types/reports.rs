//! Aggregated reporting and dashboard projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::event::Event;

/// User counts broken down by role.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleCounts {
    pub admins: u64,
    pub teachers: u64,
    pub students: u64,
}

impl RoleCounts {
    pub fn total(&self) -> u64 {
        self.admins + self.teachers + self.students
    }
}

/// Event counts broken down by computed status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub upcoming: u64,
    pub ongoing: u64,
    pub completed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.upcoming + self.ongoing + self.completed
    }
}

/// Admin dashboard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub users: RoleCounts,
    pub events: StatusCounts,
    pub events_today: u64,
    pub registrations_today: u64,
}

/// Windowed analytics over recent activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAnalytics {
    pub window_days: u32,
    pub events_created: u64,
    pub registrations: u64,
    pub participation_by_role: RoleCounts,
}

/// Per-teacher dashboard: own events by status plus recent activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherDashboard {
    pub events: StatusCounts,
    pub total_attendees: u64,
    pub recent_events: Vec<Event>,
}

/// One row of the attendance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub event_id: Uuid,
    pub title: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub attendee_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// Percentage of capacity filled, rounded to a whole number.
    /// Unlimited-capacity events report 100.
    pub fill_rate_percent: u32,
}

impl AttendanceRow {
    /// Fill rate for a given attendee count and capacity.
    pub fn fill_rate(attendee_count: u64, capacity: Option<u32>) -> u32 {
        match capacity {
            Some(cap) if cap > 0 => {
                ((attendee_count as f64 / f64::from(cap)) * 100.0).round() as u32
            }
            _ => 100,
        }
    }
}
