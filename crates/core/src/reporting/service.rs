//! Dashboard and analytics service

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use convene_domain::constants::{DEFAULT_ANALYTICS_WINDOW_DAYS, RECENT_EVENTS_LIMIT};
use convene_domain::{
    AttendanceRow, DashboardStats, EventAnalytics, Result, TeacherDashboard,
};
use uuid::Uuid;

use super::ports::ReportingStore;
use crate::clock::Clock;
use crate::status::compute_status;

/// Reporting service for admin and teacher dashboards
pub struct ReportingService {
    reports: Arc<dyn ReportingStore>,
    clock: Arc<dyn Clock>,
}

impl ReportingService {
    /// Create a new reporting service
    pub fn new(reports: Arc<dyn ReportingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { reports, clock }
    }

    /// Admin dashboard snapshot: population counts plus today's activity.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let now = self.clock.now();
        let day_start = start_of_day(now);
        let day_end = day_start + Duration::days(1);

        let users = self.reports.count_users_by_role().await?;
        let events = self.reports.count_events_by_status(now, None).await?;
        let events_today =
            self.reports.count_events_created_between(day_start, day_end, None).await?;
        let registrations_today =
            self.reports.count_registrations_between(day_start, day_end).await?;

        Ok(DashboardStats { users, events, events_today, registrations_today })
    }

    /// Activity over the trailing `days` window (default 30, capped at 365).
    pub async fn event_analytics(&self, days: Option<u32>) -> Result<EventAnalytics> {
        let window_days = days.unwrap_or(DEFAULT_ANALYTICS_WINDOW_DAYS).clamp(1, 365);
        let now = self.clock.now();
        let start = now - Duration::days(i64::from(window_days));

        let events_created =
            self.reports.count_events_created_between(start, now, None).await?;
        let registrations = self.reports.count_registrations_between(start, now).await?;
        let participation_by_role =
            self.reports.registrations_by_role_between(start, now).await?;

        Ok(EventAnalytics { window_days, events_created, registrations, participation_by_role })
    }

    /// Per-teacher dashboard over their own events.
    ///
    /// Recent events carry their computed status, like every other read path.
    pub async fn teacher_dashboard(&self, teacher_id: Uuid) -> Result<TeacherDashboard> {
        let now = self.clock.now();

        let events = self.reports.count_events_by_status(now, Some(teacher_id)).await?;
        let total_attendees = self.reports.total_attendees(Some(teacher_id)).await?;
        let mut recent_events =
            self.reports.recent_events(teacher_id, RECENT_EVENTS_LIMIT).await?;
        for event in &mut recent_events {
            event.status = compute_status(event.start_time, event.end_time, now);
        }

        Ok(TeacherDashboard { events, total_attendees, recent_events })
    }

    /// Attendance report: one row per event with its fill rate.
    pub async fn attendance_report(&self) -> Result<Vec<AttendanceRow>> {
        self.reports.attendance_rows().await
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_hms_opt(0, 0, 0).map_or(now, |naive| naive.and_utc())
}
