//! The sync engine: a one-directional drain of the local queue into the
//! remote store.
//!
//! One cycle runs
//! `CHECK_REACHABILITY → FETCH_BATCH → VALIDATE → PUSH → RECONCILE_LOCAL`
//! and stops at the first state that has nothing more to do. Local rows are
//! only touched in `RECONCILE_LOCAL`, after the remote commit is confirmed,
//! so every abort leaves the local store exactly as it was.
//!
//! Delivery is at-least-once: if the process dies (or the local write fails)
//! between the remote commit and the local reconcile, the batch is sent again
//! by the next cycle.

use crate::core::lock::CycleLock;
use crate::db::store::LocalStore;
use crate::errors::{AppError, AppResult, RemoteError, ValidationError};
use crate::models::event::{Event, RemoteRow};
use crate::models::policy::ReconcilePolicy;
use crate::remote::{ReachabilityProbe, RemoteStore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Upper bound on rows per cycle; keeps one remote statement well under the
/// PostgreSQL bind-parameter limit.
pub const MAX_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub batch_size: usize,
    /// Bound on the whole push, connection setup included.
    pub remote_timeout: Duration,
    pub probe_timeout: Duration,
    pub policy: ReconcilePolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            policy: ReconcilePolicy::default(),
        }
    }
}

impl SyncSettings {
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }
}

/// How a cycle ended. Every variant leaves the stores consistent; only
/// `Synced` changed anything.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Another cycle was in flight; this trigger was dropped.
    Busy,
    Unreachable,
    NothingToSync,
    /// Every fetched row failed validation; they stay local and unsynced.
    NoValidRecords { skipped: usize },
    Synced {
        pushed: usize,
        skipped: usize,
        /// Pushed rows edited locally while the push was in flight; left
        /// unsynced so the next cycle sends their current contents.
        requeued: usize,
        policy: ReconcilePolicy,
    },
    /// The remote rejected or lost the batch; nothing changed locally.
    PushFailed {
        attempted: usize,
        skipped: usize,
        error: RemoteError,
    },
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::PushFailed { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Busy => write!(f, "another sync cycle is already running"),
            SyncOutcome::Unreachable => write!(f, "remote server unreachable, nothing sent"),
            SyncOutcome::NothingToSync => write!(f, "no unsynced records"),
            SyncOutcome::NoValidRecords { skipped } => {
                write!(f, "no valid records ({skipped} skipped for missing fields)")
            }
            SyncOutcome::Synced {
                pushed,
                skipped,
                requeued,
                policy,
            } => {
                let action = match policy {
                    ReconcilePolicy::MarkSynced => "marked synced",
                    ReconcilePolicy::Delete => "deleted locally",
                };
                write!(f, "synced {pushed} record(s), {action}")?;
                if *requeued > 0 {
                    write!(f, "; {requeued} changed during the push, queued again")?;
                }
                if *skipped > 0 {
                    write!(f, "; {skipped} skipped for missing fields")?;
                }
                Ok(())
            }
            SyncOutcome::PushFailed {
                attempted, error, ..
            } => write!(f, "push of {attempted} record(s) failed: {error}"),
        }
    }
}

/// A fetched batch split into what can be pushed and what cannot.
///
/// `events[i]` is the local snapshot `rows[i]` was projected from.
#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub events: Vec<Event>,
    pub rows: Vec<RemoteRow>,
    pub rejected: Vec<ValidationError>,
}

/// Project each event to its remote columns, setting aside rows with a NULL
/// required field.
pub fn validate_batch(batch: &[Event]) -> ValidatedBatch {
    let mut out = ValidatedBatch::default();
    for ev in batch {
        match RemoteRow::try_from(ev) {
            Ok(row) => {
                out.events.push(ev.clone());
                out.rows.push(row);
            }
            Err(e) => out.rejected.push(e),
        }
    }
    out
}

pub struct SyncEngine {
    local: LocalStore,
    remote: Arc<dyn RemoteStore>,
    probe: ReachabilityProbe,
    settings: SyncSettings,
    cycle: Mutex<()>,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("local", &self.local)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(local: LocalStore, remote: Arc<dyn RemoteStore>, settings: SyncSettings) -> Self {
        let probe = ReachabilityProbe::new(settings.probe_timeout);
        Self {
            local,
            remote,
            probe,
            settings,
            cycle: Mutex::new(()),
        }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Run one sync cycle.
    ///
    /// Remote failures come back as an `Ok` outcome; `Err` is reserved for
    /// local storage failures, including a failed reconcile after a
    /// successful push.
    pub async fn run_cycle(&self) -> AppResult<SyncOutcome> {
        let Ok(_guard) = self.cycle.try_lock() else {
            debug!("sync cycle already in progress, trigger dropped");
            return Ok(SyncOutcome::Busy);
        };
        let Some(_file_lock) = CycleLock::try_acquire(&self.local.lock_path())? else {
            debug!(lock = %self.local.lock_path().display(), "sync lock held by another process");
            return Ok(SyncOutcome::Busy);
        };

        let result = self.cycle_steps().await;
        self.audit(&result);
        result
    }

    async fn cycle_steps(&self) -> AppResult<SyncOutcome> {
        let table = self.local.table();

        if !self.probe.is_reachable(self.remote.as_ref()).await {
            info!(table, "remote unreachable, sync skipped");
            return Ok(SyncOutcome::Unreachable);
        }

        let batch = self
            .local
            .fetch_unsynced(self.settings.effective_batch_size())
            .inspect_err(|e| error!(table, error = %e, "failed to read unsynced records"))?;
        if batch.is_empty() {
            info!(table, "no unsynced records");
            return Ok(SyncOutcome::NothingToSync);
        }
        info!(table, fetched = batch.len(), "fetched unsynced records");

        let ValidatedBatch {
            events,
            rows,
            rejected,
        } = validate_batch(&batch);
        for r in &rejected {
            warn!(
                table,
                id = r.id,
                missing = ?r.missing,
                "record skipped: missing required fields"
            );
        }
        let skipped = rejected.len();
        if rows.is_empty() {
            info!(table, skipped, "no valid records to sync");
            return Ok(SyncOutcome::NoValidRecords { skipped });
        }

        let attempted = rows.len();
        let push =
            tokio::time::timeout(self.settings.remote_timeout, self.remote.bulk_insert(&rows));
        let inserted = match push.await {
            Ok(Ok(n)) => n,
            Ok(Err(error)) => {
                if error.is_transient() {
                    warn!(table, attempted, error = %error, "remote push failed, batch rolled back");
                } else {
                    error!(table, attempted, error = %error, "remote rejected the batch");
                }
                return Ok(SyncOutcome::PushFailed {
                    attempted,
                    skipped,
                    error,
                });
            }
            Err(_) => {
                let error = RemoteError::Timeout(self.settings.remote_timeout);
                warn!(table, attempted, error = %error, "remote push timed out, batch abandoned");
                return Ok(SyncOutcome::PushFailed {
                    attempted,
                    skipped,
                    error,
                });
            }
        };
        if inserted != attempted as u64 {
            warn!(table, attempted, inserted, "remote reported an unexpected insert count");
        }

        let requeued = self.reconcile(&events)?;

        info!(
            table,
            pushed = attempted,
            skipped,
            requeued,
            policy = %self.settings.policy,
            "sync cycle complete"
        );
        Ok(SyncOutcome::Synced {
            pushed: attempted,
            skipped,
            requeued,
            policy: self.settings.policy,
        })
    }

    /// Apply the policy to the pushed rows that still match their snapshot.
    /// Returns how many were left unsynced because they changed meanwhile.
    fn reconcile(&self, pushed: &[Event]) -> AppResult<usize> {
        match self.local.reconcile_pushed(pushed, self.settings.policy) {
            Ok(stale) => {
                if !stale.is_empty() {
                    warn!(
                        table = self.local.table(),
                        ids = ?stale,
                        "records changed locally during the push; they stay unsynced and will be sent again"
                    );
                }
                Ok(stale.len())
            }
            Err(AppError::Db(source)) => {
                error!(
                    table = self.local.table(),
                    pushed = pushed.len(),
                    error = %source,
                    "local reconcile failed after remote commit; records will be sent again"
                );
                Err(AppError::Reconcile {
                    pushed: pushed.len(),
                    source,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Record cycles that did something in the local `log` table.
    fn audit(&self, result: &AppResult<SyncOutcome>) {
        let message = match result {
            Ok(o @ SyncOutcome::Synced { .. })
            | Ok(o @ SyncOutcome::PushFailed { .. })
            | Ok(o @ SyncOutcome::NoValidRecords { .. }) => o.to_string(),
            Err(e @ AppError::Reconcile { .. }) => e.to_string(),
            _ => return,
        };

        if let Err(e) = self.local.record_log("sync", &message) {
            warn!(error = %e, "failed to write sync audit log");
        }
    }
}
