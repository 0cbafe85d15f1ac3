//! Local store adapter: the durable buffer for events recorded offline.
//!
//! A `LocalStore` is only a path plus a validated table name. Each operation
//! opens its own connection, runs inside a single transaction, and closes the
//! connection when it returns, whatever the outcome.

use crate::db::initialize::{init_db, validate_table_name};
use crate::db::log::{self, LogEntry};
use crate::db::queries::{self, EventFilter};
use crate::errors::{AppError, AppResult};
use crate::models::event::{Event, NewEvent};
use crate::models::policy::ReconcilePolicy;
use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a connection waits on a lock held by another writer.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_TABLE: &str = "clock_in_out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub total: i64,
    pub unsynced: i64,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
    table: String,
}

impl LocalStore {
    /// Open (creating if needed) the database at `path` and make sure `table`
    /// exists with the expected columns.
    pub fn open(path: impl AsRef<Path>, table: &str) -> AppResult<Self> {
        validate_table_name(table)?;

        let store = Self {
            path: path.as_ref().to_path_buf(),
            table: table.to_string(),
        };

        let conn = store.connect()?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_db(&conn, &store.table)?;

        Ok(store)
    }

    /// Map a database identifier from the command line to a file path.
    ///
    /// Existing files and names with an extension are used as given; a bare
    /// name such as `employee_tracker` becomes `employee_tracker.db`.
    pub fn resolve_path(identifier: &str) -> PathBuf {
        let p = PathBuf::from(identifier);
        if p.exists() || p.extension().is_some() {
            p
        } else {
            PathBuf::from(format!("{identifier}.db"))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Path of the advisory lock file guarding sync cycles on this database.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{}.sync.lock", self.table));
        PathBuf::from(name)
    }

    fn connect(&self) -> AppResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    pub fn insert(&self, ev: &NewEvent) -> AppResult<i64> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let id = queries::insert_event(&tx, &self.table, ev)?;
        tx.commit()?;
        Ok(id)
    }

    /// Up to `limit` unsynced rows in insertion order, read as one snapshot.
    pub fn fetch_unsynced(&self, limit: usize) -> AppResult<Vec<Event>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let rows = queries::load_unsynced(&tx, &self.table, limit)?;
        tx.commit()?;
        Ok(rows)
    }

    /// Set `synced = 1` on `ids`; all or nothing. Returns rows changed.
    pub fn mark_synced(&self, ids: &[i64]) -> AppResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let n = queries::mark_synced(&tx, &self.table, ids)?;
        tx.commit()?;
        Ok(n)
    }

    /// Remove `ids`; all or nothing. Returns rows removed.
    pub fn delete(&self, ids: &[i64]) -> AppResult<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let n = queries::delete_events(&tx, &self.table, ids)?;
        tx.commit()?;
        Ok(n)
    }

    /// Reconcile rows the remote has committed, inside one transaction.
    ///
    /// Each row is re-read and only flagged (or deleted) if it still equals
    /// the snapshot that was pushed. Rows edited since then stay unsynced, so
    /// the next cycle sends their current contents. Returns their ids.
    pub fn reconcile_pushed(
        &self,
        pushed: &[Event],
        policy: ReconcilePolicy,
    ) -> AppResult<Vec<i64>> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut unchanged = Vec::with_capacity(pushed.len());
        let mut stale = Vec::new();
        for snapshot in pushed {
            match queries::load_by_id(&tx, &self.table, snapshot.id)? {
                Some(current) if current == *snapshot => unchanged.push(snapshot.id),
                _ => stale.push(snapshot.id),
            }
        }

        match policy {
            ReconcilePolicy::MarkSynced => queries::mark_synced(&tx, &self.table, &unchanged)?,
            ReconcilePolicy::Delete => queries::delete_events(&tx, &self.table, &unchanged)?,
        };
        tx.commit()?;
        Ok(stale)
    }

    pub fn fetch_all(&self) -> AppResult<Vec<Event>> {
        let conn = self.connect()?;
        Ok(queries::load_all(&conn, &self.table)?)
    }

    pub fn fetch_filtered(&self, filter: &EventFilter) -> AppResult<Vec<Event>> {
        let conn = self.connect()?;
        Ok(queries::load_filtered(&conn, &self.table, filter)?)
    }

    pub fn fetch_by_id(&self, id: i64) -> AppResult<Option<Event>> {
        let conn = self.connect()?;
        Ok(queries::load_by_id(&conn, &self.table, id)?)
    }

    /// Close the latest open clock-in of `employee_id`. Returns the row id.
    ///
    /// Only unsynced rows can be closed: once a row is on the server its
    /// remote id is unknown here, so a local edit could never reach it.
    pub fn clock_out(&self, employee_id: i64, at: NaiveDateTime) -> AppResult<i64> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let open = queries::load_open_for_employee(&tx, &self.table, employee_id)?
            .ok_or(AppError::NoOpenClockIn(employee_id))?;

        if open.synced {
            return Err(AppError::AlreadySynced(open.id));
        }
        if let Some(clock_in) = open.clock_in {
            if at < clock_in {
                return Err(AppError::InvalidTimestamp(format!(
                    "clock-out {at} is before clock-in {clock_in}"
                )));
            }
        }

        queries::set_clock_out(&tx, &self.table, open.id, at, now())?;
        tx.commit()?;
        Ok(open.id)
    }

    /// Correct the employee id of a row that has not been synced yet.
    pub fn update_employee(&self, id: i64, employee_id: i64) -> AppResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ev = queries::load_by_id(&tx, &self.table, id)?.ok_or(AppError::NotFound(id))?;
        if ev.synced {
            return Err(AppError::AlreadySynced(id));
        }

        queries::set_employee(&tx, &self.table, id, employee_id, now())?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a single row. Unsynced rows are only removed with `force`,
    /// since they exist nowhere else.
    pub fn delete_one(&self, id: i64, force: bool) -> AppResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let ev = queries::load_by_id(&tx, &self.table, id)?.ok_or(AppError::NotFound(id))?;
        if !ev.synced && !force {
            return Err(AppError::NotYetSynced(id));
        }

        queries::delete_events(&tx, &self.table, &[id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn counts(&self) -> AppResult<StoreCounts> {
        let conn = self.connect()?;
        let (total, unsynced) = queries::count_rows(&conn, &self.table)?;
        Ok(StoreCounts { total, unsynced })
    }

    /// Append an audit line to the internal `log` table.
    pub fn record_log(&self, operation: &str, message: &str) -> AppResult<()> {
        let conn = self.connect()?;
        log::ttlog(&conn, operation, &self.table, message)?;
        Ok(())
    }

    pub fn load_log(&self, limit: usize) -> AppResult<Vec<LogEntry>> {
        let conn = self.connect()?;
        Ok(log::load_log(&conn, limit)?)
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
