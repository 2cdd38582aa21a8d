//! SQLite-backed user repository.
//!
//! Implements the `UserStore` port. Email uniqueness is enforced twice: an
//! explicit check inside an immediate transaction produces the typed
//! `EmailTaken` outcome, and the NOCASE unique index backs it up against
//! anything that slips past. Deleting a user cascades to their registrations
//! and to the events they created.

use std::sync::Arc;

use async_trait::async_trait;
use convene_core::UserStore;
use convene_domain::constants::DEFAULT_PAGE_SIZE;
use convene_domain::{ConveneError, Page, Result, User, UserFilter};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, ToSql, TransactionBehavior,
};
use tokio::task;
use uuid::Uuid;

use super::columns::{column_role, column_timestamp, column_uuid, sql_timestamp, sql_uuid};
use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the user store.
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<Option<User>> {
            let conn = db.get_connection()?;
            load_user(&conn, id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let db = Arc::clone(&self.db);
        let email = email.to_owned();
        task::spawn_blocking(move || -> Result<Option<User>> {
            let conn = db.get_connection()?;
            // The email column carries COLLATE NOCASE, so equality here is
            // already case-insensitive.
            let user = conn
                .query_row(SELECT_USER_BY_EMAIL_SQL, params![email], map_user_row)
                .optional()
                .map_err(map_sql_error)?;
            match user {
                Some(mut user) => {
                    user.events_attended =
                        load_attended(&conn, user.id).map_err(map_sql_error)?;
                    Ok(Some(user))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();
        task::spawn_blocking(move || -> Result<Vec<User>> {
            let conn = db.get_connection()?;
            load_users_by_ids(&conn, &ids).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let db = Arc::clone(&self.db);
        let user = user.clone();
        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            insert_user_tx(&mut conn, &user)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let db = Arc::clone(&self.db);
        let user = user.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    UPDATE_USER_SQL,
                    params![
                        sql_uuid(user.id),
                        user.name,
                        user.email,
                        user.password_hash,
                        user.role.to_string(),
                        sql_timestamp(user.updated_at),
                    ],
                )
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(ConveneError::NotFound("User not found".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            // Registrations go with the user, and so do events they created;
            // both cascades are declared in the schema.
            let deleted =
                conn.execute(DELETE_USER_SQL, params![sql_uuid(id)]).map_err(map_sql_error)?;
            if deleted == 0 {
                return Err(ConveneError::NotFound("User not found".to_string()));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Page<User>> {
        let db = Arc::clone(&self.db);
        let filter = filter.clone();
        task::spawn_blocking(move || -> Result<Page<User>> {
            let conn = db.get_connection()?;
            list_users_page(&conn, &filter).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

const SELECT_USER_SQL: &str = "SELECT id, name, email, password_hash, role, created_at, updated_at
    FROM users
    WHERE id = ?1";

const SELECT_USER_BY_EMAIL_SQL: &str =
    "SELECT id, name, email, password_hash, role, created_at, updated_at
    FROM users
    WHERE email = ?1";

const SELECT_ATTENDED_SQL: &str =
    "SELECT event_id FROM registrations WHERE user_id = ?1 ORDER BY created_at, rowid";

const EMAIL_EXISTS_SQL: &str = "SELECT 1 FROM users WHERE email = ?1";

const INSERT_USER_SQL: &str = "INSERT INTO users (
        id, name, email, password_hash, role, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const UPDATE_USER_SQL: &str = "UPDATE users SET
        name = ?2, email = ?3, password_hash = ?4, role = ?5, updated_at = ?6
    WHERE id = ?1";

const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id = ?1";

const USER_SEARCH_CLAUSE: &str =
    "(LOWER(name) LIKE :search OR LOWER(email) LIKE :search)";

fn load_user(conn: &Connection, id: Uuid) -> rusqlite::Result<Option<User>> {
    let user = conn
        .query_row(SELECT_USER_SQL, params![sql_uuid(id)], map_user_row)
        .optional()?;

    match user {
        Some(mut user) => {
            user.events_attended = load_attended(conn, id)?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

fn load_attended(conn: &Connection, user_id: Uuid) -> rusqlite::Result<Vec<Uuid>> {
    let mut stmt = conn.prepare(SELECT_ATTENDED_SQL)?;
    let rows = stmt.query_map(params![sql_uuid(user_id)], |row| column_uuid(row, 0))?;
    rows.collect()
}

fn load_users_by_ids(conn: &Connection, ids: &[Uuid]) -> rusqlite::Result<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT id, name, email, password_hash, role, created_at, updated_at
         FROM users
         WHERE id IN ({placeholders})"
    );
    let id_texts: Vec<String> = ids.iter().map(|id| sql_uuid(*id)).collect();

    let mut stmt = conn.prepare(&sql)?;
    let mut users = stmt
        .query_map(params_from_iter(id_texts.iter()), map_user_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for user in &mut users {
        user.events_attended = load_attended(conn, user.id)?;
    }

    Ok(users)
}

fn insert_user_tx(conn: &mut Connection, user: &User) -> Result<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(map_sql_error)?;

    let taken: Option<i32> = tx
        .query_row(EMAIL_EXISTS_SQL, params![user.email], |row| row.get(0))
        .optional()
        .map_err(map_sql_error)?;
    if taken.is_some() {
        return Err(ConveneError::EmailTaken(user.email.clone()));
    }

    tx.execute(
        INSERT_USER_SQL,
        params![
            sql_uuid(user.id),
            user.name,
            user.email,
            user.password_hash,
            user.role.to_string(),
            sql_timestamp(user.created_at),
            sql_timestamp(user.updated_at),
        ],
    )
    .map_err(map_sql_error)?;
    tx.commit().map_err(map_sql_error)?;
    Ok(())
}

fn list_users_page(conn: &Connection, filter: &UserFilter) -> rusqlite::Result<Page<User>> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter.per_page.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let role_text = filter.role.map(|role| role.to_string());
    let search_text =
        filter.search.as_ref().map(|term| format!("%{}%", term.to_lowercase()));
    let limit = i64::from(per_page);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let mut clauses: Vec<&str> = Vec::new();
    let mut filter_params: Vec<(&str, &dyn ToSql)> = Vec::new();

    if let Some(ref role) = role_text {
        clauses.push("role = :role");
        filter_params.push((":role", role));
    }
    if let Some(ref search) = search_text {
        clauses.push(USER_SEARCH_CLAUSE);
        filter_params.push((":search", search));
    }

    let where_sql =
        if clauses.is_empty() { String::new() } else { format!(" WHERE {}", clauses.join(" AND ")) };

    let count_sql = format!("SELECT COUNT(*) FROM users{where_sql}");
    let total: i64 =
        conn.query_row(&count_sql, filter_params.as_slice(), |row| row.get(0))?;

    let page_sql = format!(
        "SELECT id, name, email, password_hash, role, created_at, updated_at
         FROM users{where_sql}
         ORDER BY name, created_at
         LIMIT :limit OFFSET :offset"
    );
    let mut page_params = filter_params.clone();
    page_params.push((":limit", &limit));
    page_params.push((":offset", &offset));

    let mut stmt = conn.prepare(&page_sql)?;
    let mut items =
        stmt.query_map(page_params.as_slice(), map_user_row)?.collect::<rusqlite::Result<Vec<_>>>()?;

    for user in &mut items {
        user.events_attended = load_attended(conn, user.id)?;
    }

    Ok(Page::new(items, total as u64, page, per_page))
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: column_uuid(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: column_role(row, 4)?,
        events_attended: Vec::new(),
        created_at: column_timestamp(row, 5)?,
        updated_at: column_timestamp(row, 6)?,
    })
}

fn map_sql_error(err: rusqlite::Error) -> ConveneError {
    ConveneError::from(InfraError::from(err))
}

fn map_join_error(err: task::JoinError) -> ConveneError {
    if err.is_cancelled() {
        ConveneError::Internal("blocking user repository task cancelled".into())
    } else {
        ConveneError::Internal(format!("blocking user repository task failed: {err}"))
    }
}
