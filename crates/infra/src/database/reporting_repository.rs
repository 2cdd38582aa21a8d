//! SQLite-backed reporting aggregates.
//!
//! Implements the `ReportingStore` port. Counting and grouping happen in SQL;
//! wherever a count depends on event status, the query buckets by the status
//! computed at the caller's `now` instead of trusting the cached column.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convene_core::ReportingStore;
use convene_domain::{AttendanceRow, ConveneError, Event, Result, RoleCounts, StatusCounts};
use rusqlite::{params, Connection, Row};
use tokio::task;
use uuid::Uuid;

use super::columns::{column_timestamp, column_uuid, sql_timestamp, sql_uuid};
use super::event_repository::{load_attendees, map_event_row};
use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the reporting store.
pub struct SqliteReportingRepository {
    db: Arc<DbManager>,
}

impl SqliteReportingRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportingStore for SqliteReportingRepository {
    async fn count_users_by_role(&self) -> Result<RoleCounts> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<RoleCounts> {
            let conn = db.get_connection()?;
            conn.query_row(USERS_BY_ROLE_SQL, [], map_role_counts_row).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_events_by_status(
        &self,
        now: DateTime<Utc>,
        created_by: Option<Uuid>,
    ) -> Result<StatusCounts> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<StatusCounts> {
            let conn = db.get_connection()?;
            let now_text = sql_timestamp(now);
            let counts = match created_by {
                Some(creator) => conn.query_row(
                    EVENTS_BY_STATUS_FOR_CREATOR_SQL,
                    params![now_text, sql_uuid(creator)],
                    map_status_counts_row,
                ),
                None => {
                    conn.query_row(EVENTS_BY_STATUS_SQL, params![now_text], map_status_counts_row)
                }
            };
            counts.map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_events_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        created_by: Option<Uuid>,
    ) -> Result<u64> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<u64> {
            let conn = db.get_connection()?;
            let start_text = sql_timestamp(start);
            let end_text = sql_timestamp(end);
            let count: i64 = match created_by {
                Some(creator) => conn.query_row(
                    EVENTS_CREATED_BETWEEN_FOR_CREATOR_SQL,
                    params![start_text, end_text, sql_uuid(creator)],
                    |row| row.get(0),
                ),
                None => conn.query_row(
                    EVENTS_CREATED_BETWEEN_SQL,
                    params![start_text, end_text],
                    |row| row.get(0),
                ),
            }
            .map_err(map_sql_error)?;
            Ok(count as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn count_registrations_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<u64> {
            let conn = db.get_connection()?;
            let count: i64 = conn
                .query_row(
                    REGISTRATIONS_BETWEEN_SQL,
                    params![sql_timestamp(start), sql_timestamp(end)],
                    |row| row.get(0),
                )
                .map_err(map_sql_error)?;
            Ok(count as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn registrations_by_role_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RoleCounts> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<RoleCounts> {
            let conn = db.get_connection()?;
            conn.query_row(
                REGISTRATIONS_BY_ROLE_BETWEEN_SQL,
                params![sql_timestamp(start), sql_timestamp(end)],
                map_role_counts_row,
            )
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn total_attendees(&self, created_by: Option<Uuid>) -> Result<u64> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<u64> {
            let conn = db.get_connection()?;
            let count: i64 = match created_by {
                Some(creator) => conn.query_row(
                    TOTAL_ATTENDEES_FOR_CREATOR_SQL,
                    params![sql_uuid(creator)],
                    |row| row.get(0),
                ),
                None => conn.query_row(TOTAL_ATTENDEES_SQL, [], |row| row.get(0)),
            }
            .map_err(map_sql_error)?;
            Ok(count as u64)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn recent_events(&self, created_by: Uuid, limit: u32) -> Result<Vec<Event>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<Event>> {
            let conn = db.get_connection()?;
            load_recent_events(&conn, created_by, limit).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn attendance_rows(&self) -> Result<Vec<AttendanceRow>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<AttendanceRow>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(ATTENDANCE_ROWS_SQL).map_err(map_sql_error)?;
            let rows = stmt
                .query_map([], map_attendance_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }
}

const USERS_BY_ROLE_SQL: &str = "SELECT
        COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN role = 'teacher' THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN role = 'student' THEN 1 ELSE 0 END), 0)
    FROM users";

// Same status boundaries as the status engine: the end instant is still
// ongoing, strictly past the end is completed.
const EVENTS_BY_STATUS_SQL: &str = "SELECT
        COALESCE(SUM(CASE WHEN ?1 < start_time THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN ?1 >= start_time AND ?1 <= end_time THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN ?1 > end_time THEN 1 ELSE 0 END), 0)
    FROM events";

const EVENTS_BY_STATUS_FOR_CREATOR_SQL: &str = "SELECT
        COALESCE(SUM(CASE WHEN ?1 < start_time THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN ?1 >= start_time AND ?1 <= end_time THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN ?1 > end_time THEN 1 ELSE 0 END), 0)
    FROM events
    WHERE created_by = ?2";

const EVENTS_CREATED_BETWEEN_SQL: &str =
    "SELECT COUNT(*) FROM events WHERE created_at >= ?1 AND created_at < ?2";

const EVENTS_CREATED_BETWEEN_FOR_CREATOR_SQL: &str =
    "SELECT COUNT(*) FROM events WHERE created_at >= ?1 AND created_at < ?2 AND created_by = ?3";

const REGISTRATIONS_BETWEEN_SQL: &str =
    "SELECT COUNT(*) FROM registrations WHERE created_at >= ?1 AND created_at < ?2";

const REGISTRATIONS_BY_ROLE_BETWEEN_SQL: &str = "SELECT
        COALESCE(SUM(CASE WHEN u.role = 'admin' THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN u.role = 'teacher' THEN 1 ELSE 0 END), 0),
        COALESCE(SUM(CASE WHEN u.role = 'student' THEN 1 ELSE 0 END), 0)
    FROM registrations r
    JOIN users u ON u.id = r.user_id
    WHERE r.created_at >= ?1 AND r.created_at < ?2";

const TOTAL_ATTENDEES_SQL: &str = "SELECT COUNT(*) FROM registrations";

const TOTAL_ATTENDEES_FOR_CREATOR_SQL: &str = "SELECT COUNT(*)
    FROM registrations r
    JOIN events e ON e.id = r.event_id
    WHERE e.created_by = ?1";

const RECENT_EVENTS_SQL: &str = "SELECT id, title, description, venue, start_time, end_time,
        capacity, status, created_by, created_at, updated_at
    FROM events
    WHERE created_by = ?1
    ORDER BY created_at DESC
    LIMIT ?2";

const ATTENDANCE_ROWS_SQL: &str = "SELECT
        e.id, e.title, e.venue, e.start_time, e.capacity, COUNT(r.user_id)
    FROM events e
    LEFT JOIN registrations r ON r.event_id = e.id
    GROUP BY e.id
    ORDER BY e.start_time";

fn load_recent_events(conn: &Connection, created_by: Uuid, limit: u32) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(RECENT_EVENTS_SQL)?;
    let mut events = stmt
        .query_map(params![sql_uuid(created_by), i64::from(limit)], map_event_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for event in &mut events {
        event.attendees = load_attendees(conn, event.id)?;
    }

    Ok(events)
}

fn map_role_counts_row(row: &Row<'_>) -> rusqlite::Result<RoleCounts> {
    Ok(RoleCounts {
        admins: row.get::<_, i64>(0)? as u64,
        teachers: row.get::<_, i64>(1)? as u64,
        students: row.get::<_, i64>(2)? as u64,
    })
}

fn map_status_counts_row(row: &Row<'_>) -> rusqlite::Result<StatusCounts> {
    Ok(StatusCounts {
        upcoming: row.get::<_, i64>(0)? as u64,
        ongoing: row.get::<_, i64>(1)? as u64,
        completed: row.get::<_, i64>(2)? as u64,
    })
}

fn map_attendance_row(row: &Row<'_>) -> rusqlite::Result<AttendanceRow> {
    let attendee_count = row.get::<_, i64>(5)? as u64;
    let capacity: Option<u32> = row.get(4)?;
    Ok(AttendanceRow {
        event_id: column_uuid(row, 0)?,
        title: row.get(1)?,
        venue: row.get(2)?,
        start_time: column_timestamp(row, 3)?,
        attendee_count,
        capacity,
        fill_rate_percent: AttendanceRow::fill_rate(attendee_count, capacity),
    })
}

fn map_sql_error(err: rusqlite::Error) -> ConveneError {
    ConveneError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> ConveneError {
    if err.is_cancelled() {
        ConveneError::Internal("blocking reporting repository task cancelled".into())
    } else {
        ConveneError::Internal(format!("blocking reporting repository task failed: {err}"))
    }
}
