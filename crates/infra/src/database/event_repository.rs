//! SQLite-backed event repository.
//!
//! Implements the `EventStore` port. Registration mutations run their
//! precondition checks and the paired writes inside one immediate
//! transaction, so concurrent writers serialize at the database and every
//! check sees committed state. Status filters compare against the status
//! computed at the caller's `now`, never against the cached column.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use convene_core::registration::rules;
use convene_core::EventStore;
use convene_domain::constants::DEFAULT_PAGE_SIZE;
use convene_domain::{ConveneError, Event, EventFilter, EventStatus, Page, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use tokio::task;
use uuid::Uuid;

use super::columns::{column_status, column_timestamp, column_uuid, sql_timestamp, sql_uuid};
use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the event store.
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for SqliteEventRepository {
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Option<Event>> {
            let conn = db.get_connection()?;
            load_event(&conn, id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        let db = Arc::clone(&self.db);
        let event = event.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            insert_event_row(&conn, &event).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let db = Arc::clone(&self.db);
        let event = event.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = update_event_row(&conn, &event).map_err(map_sql_error)?;
            if changed == 0 {
                return Err(ConveneError::NotFound("Event not found".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(SET_EVENT_STATUS_SQL, params![sql_uuid(id), status.to_string()])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(ConveneError::NotFound("Event not found".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Result<Page<Event>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();
        task::spawn_blocking(move || -> Result<Page<Event>> {
            let conn = db.get_connection()?;
            list_events_page(&conn, &filter, now).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_all_events(&self) -> Result<Vec<Event>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Vec<Event>> {
            let conn = db.get_connection()?;
            load_all_events(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_event(&self, id: Uuid) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            // Registrations go with the event through ON DELETE CASCADE.
            let deleted =
                conn.execute(DELETE_EVENT_SQL, params![sql_uuid(id)]).map_err(map_sql_error)?;
            if deleted == 0 {
                return Err(ConveneError::NotFound("Event not found".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn register_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Event> {
            let mut conn = db.get_connection()?;
            register_attendee_tx(&mut conn, event_id, user_id, now)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn unregister_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Event> {
            let mut conn = db.get_connection()?;
            unregister_attendee_tx(&mut conn, event_id, user_id, now)
        })
        .await
        .map_err(map_join_error)?
    }
}

const INSERT_EVENT_SQL: &str = "INSERT INTO events (
        id, title, description, venue, start_time, end_time,
        capacity, status, created_by, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const UPDATE_EVENT_SQL: &str = "UPDATE events SET
        title = ?2, description = ?3, venue = ?4, start_time = ?5,
        end_time = ?6, capacity = ?7, status = ?8, updated_at = ?9
    WHERE id = ?1";

const SET_EVENT_STATUS_SQL: &str = "UPDATE events SET status = ?2 WHERE id = ?1";

const SELECT_EVENT_SQL: &str = "SELECT id, title, description, venue, start_time, end_time,
        capacity, status, created_by, created_at, updated_at
    FROM events
    WHERE id = ?1";

const SELECT_ALL_EVENTS_SQL: &str = "SELECT id, title, description, venue, start_time, end_time,
        capacity, status, created_by, created_at, updated_at
    FROM events
    ORDER BY start_time, created_at";

const SELECT_ATTENDEES_SQL: &str =
    "SELECT user_id FROM registrations WHERE event_id = ?1 ORDER BY position";

const SELECT_ALL_REGISTRATIONS_SQL: &str =
    "SELECT event_id, user_id FROM registrations ORDER BY event_id, position";

const DELETE_EVENT_SQL: &str = "DELETE FROM events WHERE id = ?1";

const USER_EXISTS_SQL: &str = "SELECT 1 FROM users WHERE id = ?1";

// The position subquery runs inside the caller's immediate transaction, so
// two registrations for one event can never draw the same position.
const INSERT_REGISTRATION_SQL: &str = "INSERT INTO registrations (
        event_id, user_id, position, created_at
    ) VALUES (
        ?1, ?2,
        (SELECT COALESCE(MAX(position), 0) + 1 FROM registrations WHERE event_id = ?1),
        ?3
    )";

const DELETE_REGISTRATION_SQL: &str =
    "DELETE FROM registrations WHERE event_id = ?1 AND user_id = ?2";

const TOUCH_EVENT_SQL: &str = "UPDATE events SET updated_at = ?2 WHERE id = ?1";

// Event status at the :now parameter; the same boundaries as the status
// engine, end instant still ongoing.
const EVENT_STATUS_MATCH_CLAUSE: &str = "CASE
        WHEN :now < start_time THEN 'upcoming'
        WHEN :now > end_time THEN 'completed'
        ELSE 'ongoing'
    END = :status";

const EVENT_SEARCH_CLAUSE: &str =
    "(LOWER(title) LIKE :search OR LOWER(description) LIKE :search OR LOWER(venue) LIKE :search)";

fn insert_event_row(conn: &Connection, event: &Event) -> rusqlite::Result<()> {
    conn.execute(
        INSERT_EVENT_SQL,
        params![
            sql_uuid(event.id),
            event.title,
            event.description,
            event.venue,
            sql_timestamp(event.start_time),
            sql_timestamp(event.end_time),
            event.capacity,
            event.status.to_string(),
            sql_uuid(event.created_by),
            sql_timestamp(event.created_at),
            sql_timestamp(event.updated_at),
        ],
    )?;
    Ok(())
}

fn update_event_row(conn: &Connection, event: &Event) -> rusqlite::Result<usize> {
    conn.execute(
        UPDATE_EVENT_SQL,
        params![
            sql_uuid(event.id),
            event.title,
            event.description,
            event.venue,
            sql_timestamp(event.start_time),
            sql_timestamp(event.end_time),
            event.capacity,
            event.status.to_string(),
            sql_timestamp(event.updated_at),
        ],
    )
}

fn load_event(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<Event>> {
    let event = conn
        .query_row(SELECT_EVENT_SQL, params![sql_uuid(id)], map_event_row)
        .optional()?;

    match event {
        Some(mut event) => {
            event.attendees = load_attendees(conn, id)?;
            Ok(Some(event))
        }
        None => Ok(None),
    }
}

pub(crate) fn load_attendees(conn: &Connection, event_id: Uuid) -> rusqlite::Result<Vec<Uuid>> {
    let mut stmt = conn.prepare(SELECT_ATTENDEES_SQL)?;
    let rows = stmt.query_map(params![sql_uuid(event_id)], |row| column_uuid(row, 0))?;
    rows.collect()
}

fn load_all_events(conn: &Connection) -> rusqlite::Result<Vec<Event>> {
    let mut stmt = conn.prepare(SELECT_ALL_EVENTS_SQL)?;
    let mut events = stmt.query_map([], map_event_row)?.collect::<rusqlite::Result<Vec<_>>>()?;

    // One pass over the registrations table instead of a query per event.
    let mut attendees: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut reg_stmt = conn.prepare(SELECT_ALL_REGISTRATIONS_SQL)?;
    let pairs = reg_stmt
        .query_map([], |row| Ok((column_uuid(row, 0)?, column_uuid(row, 1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (event_id, user_id) in pairs {
        attendees.entry(event_id).or_default().push(user_id);
    }

    for event in &mut events {
        if let Some(list) = attendees.remove(&event.id) {
            event.attendees = list;
        }
    }

    Ok(events)
}

fn list_events_page(
    conn: &Connection,
    filter: &EventFilter,
    now: DateTime<Utc>,
) -> rusqlite::Result<Page<Event>> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let now_text = sql_timestamp(now);
    let status_text = filter.status.map(|status| status.to_string());
    let search_text =
        filter.search.as_ref().map(|term| format!("%{}%", term.to_lowercase()));
    let creator_text = filter.created_by.map(sql_uuid);
    let limit = i64::from(per_page);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let mut clauses: Vec<&str> = Vec::new();
    let mut filter_params: Vec<(&str, &dyn ToSql)> = Vec::new();

    if let Some(ref status) = status_text {
        clauses.push(EVENT_STATUS_MATCH_CLAUSE);
        filter_params.push((":now", &now_text));
        filter_params.push((":status", status));
    }
    if let Some(ref search) = search_text {
        clauses.push(EVENT_SEARCH_CLAUSE);
        filter_params.push((":search", search));
    }
    if let Some(ref creator) = creator_text {
        clauses.push("created_by = :creator");
        filter_params.push((":creator", creator));
    }

    let where_sql =
        if clauses.is_empty() { String::new() } else { format!(" WHERE {}", clauses.join(" AND ")) };

    let count_sql = format!("SELECT COUNT(*) FROM events{where_sql}");
    let total: i64 =
        conn.query_row(&count_sql, filter_params.as_slice(), |row| row.get(0))?;

    let page_sql = format!(
        "SELECT id, title, description, venue, start_time, end_time,
             capacity, status, created_by, created_at, updated_at
         FROM events{where_sql}
         ORDER BY start_time, created_at
         LIMIT :limit OFFSET :offset"
    );
    let mut page_params = filter_params.clone();
    page_params.push((":limit", &limit));
    page_params.push((":offset", &offset));

    let mut stmt = conn.prepare(&page_sql)?;
    let mut items =
        stmt.query_map(page_params.as_slice(), map_event_row)?.collect::<rusqlite::Result<Vec<_>>>()?;

    for event in &mut items {
        event.attendees = load_attendees(conn, event.id)?;
    }

    Ok(Page::new(items, total as u64, page, per_page))
}

fn register_attendee_tx(
    conn: &mut Connection,
    event_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Event> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(map_sql_error)?;

    let mut event = load_event(&tx, event_id)
        .map_err(map_sql_error)?
        .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
    rules::check_register(&event, user_id, now)?;

    let user_known: Option<i32> = tx
        .query_row(USER_EXISTS_SQL, params![sql_uuid(user_id)], |row| row.get(0))
        .optional()
        .map_err(map_sql_error)?;
    if user_known.is_none() {
        return Err(ConveneError::NotFound("User not found".to_string()));
    }

    tx.execute(
        INSERT_REGISTRATION_SQL,
        params![sql_uuid(event_id), sql_uuid(user_id), sql_timestamp(now)],
    )
    .map_err(map_sql_error)?;
    tx.execute(TOUCH_EVENT_SQL, params![sql_uuid(event_id), sql_timestamp(now)])
        .map_err(map_sql_error)?;
    tx.commit().map_err(map_sql_error)?;

    event.attendees.push(user_id);
    event.updated_at = now;
    Ok(event)
}

fn unregister_attendee_tx(
    conn: &mut Connection,
    event_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Event> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(map_sql_error)?;

    let mut event = load_event(&tx, event_id)
        .map_err(map_sql_error)?
        .ok_or_else(|| ConveneError::NotFound("Event not found".to_string()))?;
    rules::check_unregister(&event, user_id, now)?;

    tx.execute(DELETE_REGISTRATION_SQL, params![sql_uuid(event_id), sql_uuid(user_id)])
        .map_err(map_sql_error)?;
    tx.execute(TOUCH_EVENT_SQL, params![sql_uuid(event_id), sql_timestamp(now)])
        .map_err(map_sql_error)?;
    tx.commit().map_err(map_sql_error)?;

    event.attendees.retain(|attendee| *attendee != user_id);
    event.updated_at = now;
    Ok(event)
}

pub(crate) fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: column_uuid(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        venue: row.get(3)?,
        start_time: column_timestamp(row, 4)?,
        end_time: column_timestamp(row, 5)?,
        capacity: row.get(6)?,
        status: column_status(row, 7)?,
        created_by: column_uuid(row, 8)?,
        attendees: Vec::new(),
        created_at: column_timestamp(row, 9)?,
        updated_at: column_timestamp(row, 10)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> ConveneError {
    ConveneError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> ConveneError {
    if err.is_cancelled() {
        ConveneError::Internal("blocking event repository task cancelled".into())
    } else {
        ConveneError::Internal(format!("blocking event repository task failed: {err}"))
    }
}
