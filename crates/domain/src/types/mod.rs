//! Domain types and models

pub mod event;
pub mod reports;
pub mod user;

use serde::{Deserialize, Serialize};

// Re-export entity types for convenience
pub use event::{Event, EventDetails, EventFilter, EventPatch, EventStatus, NewEvent};
pub use reports::{
    AttendanceRow, DashboardStats, EventAnalytics, RoleCounts, StatusCounts, TeacherDashboard,
};
pub use user::{NewUser, PublicUser, Role, User, UserFilter, UserPatch};

/// One page of a listing, with enough metadata for clients to paginate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `total_pages` from the total row count.
    pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            ((total + u64::from(per_page) - 1) / u64::from(per_page)) as u32
        };
        Self { items, total, page, per_page, total_pages }
    }
}
