//! Pooled SQLite connection management.

use std::path::Path;
use std::time::Duration;

use convene_domain::Result;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Hands out pooled SQLite connections with the session pragmas applied.
///
/// Every connection has WAL journaling, foreign key enforcement and a busy
/// timeout configured, so the repositories can rely on cascading deletes
/// and on writers waiting for each other instead of failing fast.
pub struct DbManager {
    pool: Pool<SqliteConnectionManager>,
}

impl DbManager {
    /// Open (or create) the database file and build a pool over it.
    pub fn new<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self> {
        let path = path.as_ref();

        let manager = SqliteConnectionManager::file(path).with_init(apply_session_pragmas);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)
            .map_err(InfraError::from)?;

        info!(path = %path.display(), pool_size = pool.max_size(), "sqlite connection pool ready");
        Ok(Self { pool })
    }

    /// Borrow a connection, waiting up to the pool's timeout for one to free up.
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        Ok(conn)
    }

    /// Apply the schema to the database; safe to run on every boot.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        install_schema(&conn)
    }

    /// Round-trip a trivial query to prove the pool hands out live connections.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0)).map_err(InfraError::from)?;
        Ok(())
    }
}

/// Session pragmas for every pooled connection.
///
/// WAL keeps readers unblocked during writes. Foreign keys make the
/// schema's cascades real; the busy timeout queues concurrent writers
/// instead of surfacing SQLITE_BUSY.
fn apply_session_pragmas(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )
}

fn install_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(InfraError::from)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at)
         VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        [SCHEMA_VERSION],
    )
    .map_err(InfraError::from)?;
    Ok(())
}
