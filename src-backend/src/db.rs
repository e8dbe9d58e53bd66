//! Database Connection and Setup
//!
//! Opens the SQLite database and runs migrations.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use goal_tracker::{DomainError, DomainResult};
use rusqlite::types::Type;
use rusqlite::Connection;
use tokio::sync::Mutex;

/// Shared connection handed to the repositories
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Database state wrapper
pub struct DbState {
    conn: SharedConnection,
}

impl DbState {
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }
}

/// Open (or create) the database at `db_path` and migrate it.
///
/// `:memory:` opens a private in-memory database.
pub fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open {}: {}", db_path.display(), e)))?;
    run_migrations(&conn)?;
    tracing::debug!(path = %db_path.display(), "database ready");

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
    })
}

pub(crate) fn db_err(e: rusqlite::Error) -> DomainError {
    DomainError::Internal(e.to_string())
}

/// Fixed-width UTC timestamps so stored values sort lexically
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> DomainResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(db_err)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(db_err)?;
    for name in names {
        if name.map_err(db_err)? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS goals (
            goal_id TEXT PRIMARY KEY,
            goal_text TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )
    .map_err(db_err)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            task_id TEXT PRIMARY KEY,
            goal_id TEXT NOT NULL,
            task_text TEXT NOT NULL,
            order_key REAL NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        (),
    )
    .map_err(db_err)?;

    // Deadlines and the timer came later
    if !column_exists(conn, "tasks", "deadline")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN deadline TEXT", ())
            .map_err(|e| DomainError::Internal(format!("Failed to add deadline: {}", e)))?;
    }

    if !column_exists(conn, "tasks", "time_spent")? {
        conn.execute("ALTER TABLE tasks ADD COLUMN time_spent INTEGER NOT NULL DEFAULT 0", ())
            .map_err(|e| DomainError::Internal(format!("Failed to add time_spent: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_goal ON tasks(goal_id, order_key)",
        (),
    )
    .map_err(db_err)?;

    Ok(())
}
