//! Idempotent schema setup for the local store.
//!
//! Tables are created if absent. Tables written by older producers that lack
//! the audit columns get them added in place; nothing else is ever altered.

use crate::errors::{AppError, AppResult};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension};
use std::sync::LazyLock;
use tracing::info;

static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid table-name pattern")
});

/// Columns the sync engine relies on; a pre-existing table missing any of
/// them cannot be used.
const REQUIRED_COLUMNS: [&str; 5] = ["id", "employee_id", "clock_in", "clock_out", "synced"];

/// Audit columns added to older tables when missing.
const AUDIT_COLUMNS: [&str; 2] = ["created_at", "modified_at"];

/// Validate a table name before it is interpolated into SQL.
pub fn validate_table_name(name: &str) -> AppResult<()> {
    if TABLE_NAME.is_match(name) && !name.to_lowercase().starts_with("sqlite_") {
        Ok(())
    } else {
        Err(AppError::InvalidTable(name.to_string()))
    }
}

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let exists: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{table}\")"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut out = Vec::new();
    for c in cols {
        out.push(c?.to_lowercase());
    }
    Ok(out)
}

/// Create the attendance table with the current schema.
fn create_events_table(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id  INTEGER,
            clock_in     TIMESTAMP,
            clock_out    TIMESTAMP,
            synced       BOOLEAN NOT NULL DEFAULT 0,
            created_at   TIMESTAMP,
            modified_at  TIMESTAMP
        );
        "#
    ))
}

fn ensure_synced_index(conn: &Connection, table: &str) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        r#"CREATE INDEX IF NOT EXISTS "idx_{table}_synced" ON "{table}"(synced, id);"#
    ))
}

/// Bring an existing table up to the current shape.
fn upgrade_events_table(conn: &Connection, table: &str) -> AppResult<()> {
    let cols = table_columns(conn, table)?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !cols.iter().any(|have| have == c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::InvalidTable(format!(
            "{table} (missing column(s): {})",
            missing.join(", ")
        )));
    }

    for col in AUDIT_COLUMNS {
        if !cols.iter().any(|have| have == col) {
            conn.execute_batch(&format!(
                r#"ALTER TABLE "{table}" ADD COLUMN {col} TIMESTAMP;"#
            ))?;
            info!(table, column = col, "added missing audit column");
        }
    }

    Ok(())
}

/// Initialize the local database for `table`.
pub fn init_db(conn: &Connection, table: &str) -> AppResult<()> {
    validate_table_name(table)?;

    ensure_log_table(conn)?;

    if table_exists(conn, table)? {
        upgrade_events_table(conn, table)?;
    } else {
        create_events_table(conn, table)?;
        info!(table, "created local attendance table");
    }

    ensure_synced_index(conn, table)?;
    Ok(())
}
