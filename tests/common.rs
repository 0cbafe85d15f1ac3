#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use clocksync::core::sync::{SyncEngine, SyncSettings};
use clocksync::db::store::LocalStore;
use clocksync::errors::RemoteError;
use clocksync::models::event::{NewEvent, RemoteRow};
use clocksync::remote::RemoteStore;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TABLE: &str = "clock_in_out";

pub fn clocksync() -> Command {
    cargo_bin_cmd!("clocksync")
}

/// Create a unique test DB path inside the system temp dir and remove any
/// leftovers (database, WAL files, sync lock) from a previous run.
pub fn setup_test_db(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_clocksync.sqlite", name));

    for suffix in ["", "-wal", "-shm", &format!(".{TABLE}.sync.lock")] {
        let mut p = path.as_os_str().to_os_string();
        p.push(suffix);
        fs::remove_file(PathBuf::from(p)).ok();
    }
    path
}

/// A throwaway HOME so CLI runs never touch the real configuration.
pub fn setup_home(name: &str) -> PathBuf {
    let mut dir = env::temp_dir();
    dir.push(format!("{}_clocksync_home", name));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).expect("create temp home");
    dir
}

pub fn open_store(name: &str) -> LocalStore {
    let path = setup_test_db(name);
    LocalStore::open(&path, TABLE).expect("open local store")
}

pub fn ts(day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .expect("valid date")
        .and_hms_opt(hour, min, 0)
        .expect("valid time")
}

/// Insert a complete clock-in/clock-out row for `employee_id`.
pub fn insert_valid(store: &LocalStore, employee_id: i64, day: u32) -> i64 {
    let ev = NewEvent::clock_in(employee_id, ts(day, 9, 0)).with_clock_out(ts(day, 17, 0));
    store.insert(&ev).expect("insert event")
}

/// Insert a row with the given (possibly missing) required fields.
pub fn insert_raw(
    store: &LocalStore,
    employee_id: Option<i64>,
    clock_in: Option<NaiveDateTime>,
) -> i64 {
    let now = ts(1, 12, 0);
    store
        .insert(&NewEvent {
            employee_id,
            clock_in,
            clock_out: None,
            created_at: now,
            modified_at: now,
        })
        .expect("insert event")
}

pub fn engine(store: &LocalStore, remote: &Arc<FakeRemote>, settings: SyncSettings) -> SyncEngine {
    SyncEngine::new(store.clone(), remote.clone(), settings)
}

/// In-memory stand-in for the central server.
///
/// Batches are all-or-nothing. With `unique_clock_in` set, a row whose
/// `(employee_id, clock_in)` already exists (or repeats inside the batch)
/// fails the whole batch, like a unique index would.
#[derive(Default)]
pub struct FakeRemote {
    reachable: AtomicBool,
    unique_clock_in: AtomicBool,
    push_delay: Mutex<Option<Duration>>,
    fail_pushes: AtomicBool,
    after_commit: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    rows: Mutex<Vec<RemoteRow>>,
    pub ping_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn online() -> Arc<Self> {
        let r = Self::default();
        r.reachable.store(true, Ordering::SeqCst);
        Arc::new(r)
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_reachable(&self, up: bool) {
        self.reachable.store(up, Ordering::SeqCst);
    }

    pub fn with_unique_clock_in(self: Arc<Self>) -> Arc<Self> {
        self.unique_clock_in.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_push_delay(&self, delay: Duration) {
        *self.push_delay.lock().unwrap() = Some(delay);
    }

    /// Make every push fail with a transient connection error.
    pub fn set_fail_pushes(&self, fail: bool) {
        self.fail_pushes.store(fail, Ordering::SeqCst);
    }

    /// Run `f` once, right after the next batch is committed.
    pub fn on_next_commit(&self, f: impl FnOnce() + Send + 'static) {
        *self.after_commit.lock().unwrap() = Some(Box::new(f));
    }

    pub fn seed(&self, row: RemoteRow) {
        self.rows.lock().unwrap().push(row);
    }

    pub fn rows(&self) -> Vec<RemoteRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn inserts(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn ping(&self) -> bool {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }

    async fn bulk_insert(&self, rows: &[RemoteRow]) -> Result<u64, RemoteError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.push_delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }

        if !self.reachable.load(Ordering::SeqCst) || self.fail_pushes.load(Ordering::SeqCst) {
            return Err(RemoteError::Connection("connection refused".into()));
        }

        let mut stored = self.rows.lock().unwrap();
        if self.unique_clock_in.load(Ordering::SeqCst) {
            let mut seen: Vec<(i64, NaiveDateTime)> =
                stored.iter().map(|r| (r.employee_id, r.clock_in)).collect();
            for r in rows {
                let key = (r.employee_id, r.clock_in);
                if seen.contains(&key) {
                    return Err(RemoteError::Constraint(format!(
                        "duplicate key (employee_id, clock_in)=({}, {})",
                        r.employee_id, r.clock_in
                    )));
                }
                seen.push(key);
            }
        }

        stored.extend_from_slice(rows);
        drop(stored);

        let hook = self.after_commit.lock().unwrap().take();
        if let Some(f) = hook {
            f();
        }
        Ok(rows.len() as u64)
    }
}
