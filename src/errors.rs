//! Unified application error type.
//! All modules (db, remote, core, cli) return AppError to keep the error
//! handling consistent and easy to manage. Remote adapter failures and
//! row validation failures have their own focused types.

use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local store
    // ---------------------------
    #[error("Local storage error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Record {0} is already synced and can no longer be changed locally")]
    AlreadySynced(i64),

    #[error("Record {0} has not been synced yet (use --force to delete it anyway)")]
    NotYetSynced(i64),

    #[error("No open clock-in found for employee {0}")]
    NoOpenClockIn(i64),

    // ---------------------------
    // Remote store
    // ---------------------------
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// The remote commit succeeded but the local reconcile did not: the
    /// pushed rows are still unsynced locally and will be sent again.
    #[error("{pushed} record(s) committed remotely but local reconcile failed: {source}")]
    Reconcile {
        pushed: usize,
        #[source]
        source: rusqlite::Error,
    },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures reported by a remote store adapter.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The server could not be reached or the connection broke.
    /// Transient: the same batch can be retried unchanged.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server rejected the batch (constraint violation, bad statement).
    /// Nothing was committed; retrying without correcting the data fails again.
    #[error("batch rejected by server: {0}")]
    Constraint(String),

    #[error("remote operation timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Connection(_) | RemoteError::Timeout(_))
    }
}

/// A local row that cannot be forwarded because required columns are null.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record {id} is missing required field(s): {}", missing.join(", "))]
pub struct ValidationError {
    pub id: i64,
    pub missing: Vec<&'static str>,
}
