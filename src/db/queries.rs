//! Row mapping and SQL for the attendance table.
//!
//! Every function takes the (already validated) table name and a plain
//! `&Connection`, so callers decide the transaction scope.

use crate::models::event::{Event, NewEvent};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Result, Row, params, params_from_iter};

const COLUMNS: &str = "id, employee_id, clock_in, clock_out, synced, created_at, modified_at";

/// Filters for listing local rows.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub employee_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub unsynced_only: bool,
    pub descending: bool,
}

pub fn map_row(row: &Row) -> Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        clock_in: row.get("clock_in")?,
        clock_out: row.get("clock_out")?,
        // rows written by older producers may carry NULL here
        synced: row.get::<_, Option<bool>>("synced")?.unwrap_or(false),
        created_at: row.get("created_at")?,
        modified_at: row.get("modified_at")?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

pub fn insert_event(conn: &Connection, table: &str, ev: &NewEvent) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO \"{table}\" (employee_id, clock_in, clock_out, synced, created_at, modified_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5)"
        ),
        params![
            ev.employee_id,
            ev.clock_in,
            ev.clock_out,
            ev.created_at,
            ev.modified_at
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Oldest unsynced rows first, at most `limit`.
pub fn load_unsynced(conn: &Connection, table: &str, limit: usize) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM \"{table}\"
         WHERE synced = 0 OR synced IS NULL
         ORDER BY id ASC
         LIMIT ?1"
    ))?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map([limit], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_all(conn: &Connection, table: &str) -> Result<Vec<Event>> {
    load_filtered(conn, table, &EventFilter::default())
}

pub fn load_filtered(conn: &Connection, table: &str, filter: &EventFilter) -> Result<Vec<Event>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(emp) = filter.employee_id {
        clauses.push("employee_id = ?");
        values.push(Box::new(emp));
    }
    // date() accepts both 'YYYY-MM-DD HH:MM:SS' and the ISO 'T' form
    if let Some(from) = filter.from {
        clauses.push("date(clock_in) >= ?");
        values.push(Box::new(from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = filter.to {
        clauses.push("date(clock_in) <= ?");
        values.push(Box::new(to.format("%Y-%m-%d").to_string()));
    }
    if filter.unsynced_only {
        clauses.push("(synced = 0 OR synced IS NULL)");
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let order = if filter.descending { "DESC" } else { "ASC" };

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM \"{table}\" {where_sql} ORDER BY clock_in {order}, id {order}"
    ))?;

    let rows = stmt.query_map(params_from_iter(values.iter().map(|v| v.as_ref())), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_by_id(conn: &Connection, table: &str, id: i64) -> Result<Option<Event>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM \"{table}\" WHERE id = ?1"),
        [id],
        map_row,
    )
    .optional()
}

/// Most recent row of `employee_id` that has no clock-out yet.
pub fn load_open_for_employee(
    conn: &Connection,
    table: &str,
    employee_id: i64,
) -> Result<Option<Event>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM \"{table}\"
             WHERE employee_id = ?1 AND clock_out IS NULL
             ORDER BY id DESC
             LIMIT 1"
        ),
        [employee_id],
        map_row,
    )
    .optional()
}

/// Flip `synced` to 1. Rows already synced are left alone.
pub fn mark_synced(conn: &Connection, table: &str, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    conn.execute(
        &format!(
            "UPDATE \"{table}\" SET synced = 1
             WHERE id IN ({}) AND (synced = 0 OR synced IS NULL)",
            placeholders(ids.len())
        ),
        params_from_iter(ids.iter()),
    )
}

pub fn delete_events(conn: &Connection, table: &str, ids: &[i64]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    conn.execute(
        &format!(
            "DELETE FROM \"{table}\" WHERE id IN ({})",
            placeholders(ids.len())
        ),
        params_from_iter(ids.iter()),
    )
}

pub fn set_clock_out(
    conn: &Connection,
    table: &str,
    id: i64,
    at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<usize> {
    conn.execute(
        &format!(
            "UPDATE \"{table}\" SET clock_out = ?1, modified_at = ?2
             WHERE id = ?3 AND (synced = 0 OR synced IS NULL)"
        ),
        params![at, now, id],
    )
}

pub fn set_employee(
    conn: &Connection,
    table: &str,
    id: i64,
    employee_id: i64,
    now: NaiveDateTime,
) -> Result<usize> {
    conn.execute(
        &format!(
            "UPDATE \"{table}\" SET employee_id = ?1, modified_at = ?2
             WHERE id = ?3 AND (synced = 0 OR synced IS NULL)"
        ),
        params![employee_id, now, id],
    )
}

/// (total rows, unsynced rows)
pub fn count_rows(conn: &Connection, table: &str) -> Result<(i64, i64)> {
    conn.query_row(
        &format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN synced = 0 OR synced IS NULL THEN 1 ELSE 0 END), 0)
             FROM \"{table}\""
        ),
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
}
