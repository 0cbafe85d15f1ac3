use crate::errors::ValidationError;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

/// One attendance row as stored in the local database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: i64,                           // ⇔ local surrogate key, never sent upstream
    pub employee_id: Option<i64>,          // ⇔ required for sync
    pub clock_in: Option<NaiveDateTime>,   // ⇔ required for sync
    pub clock_out: Option<NaiveDateTime>,  // ⇔ NULL while clocked in
    pub synced: bool,                      // ⇔ false → true only
    pub created_at: Option<NaiveDateTime>, // ⇔ audit only
    pub modified_at: Option<NaiveDateTime>,
}

impl Event {
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }

    /// Names of the required columns that are NULL in this row.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.employee_id.is_none() {
            missing.push("employee_id");
        }
        if self.clock_in.is_none() {
            missing.push("clock_in");
        }
        missing
    }
}

/// Insert payload for a new local row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub employee_id: Option<i64>,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub modified_at: NaiveDateTime,
}

impl NewEvent {
    /// A clock-in for `employee_id` at `at`, stamped with the current local time.
    pub fn clock_in(employee_id: i64, at: NaiveDateTime) -> Self {
        let now = Local::now().naive_local();
        Self {
            employee_id: Some(employee_id),
            clock_in: Some(at),
            clock_out: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn with_clock_out(mut self, at: NaiveDateTime) -> Self {
        self.clock_out = Some(at);
        self
    }
}

/// The column projection forwarded to the remote store.
///
/// Only constructible from a local [`Event`] whose required columns are all
/// present, so a `RemoteRow` never carries a NULL `employee_id` or `clock_in`.
/// The local id and the `synced` flag are not part of it: the server assigns
/// its own key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteRow {
    pub employee_id: i64,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
}

impl TryFrom<&Event> for RemoteRow {
    type Error = ValidationError;

    fn try_from(ev: &Event) -> Result<Self, Self::Error> {
        match (ev.employee_id, ev.clock_in) {
            (Some(employee_id), Some(clock_in)) => Ok(RemoteRow {
                employee_id,
                clock_in,
                clock_out: ev.clock_out,
                created_at: ev.created_at,
                modified_at: ev.modified_at,
            }),
            _ => Err(ValidationError {
                id: ev.id,
                missing: ev.missing_required(),
            }),
        }
    }
}
