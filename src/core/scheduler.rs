//! Periodic and on-demand triggering of the sync engine.

use crate::core::sync::{SyncEngine, SyncOutcome};
use crate::errors::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

pub struct Scheduler {
    engine: Arc<SyncEngine>,
    period: Duration,
}

impl Scheduler {
    pub fn new(engine: Arc<SyncEngine>, period: Duration) -> Self {
        // tokio::time::interval panics on a zero period
        let period = period.max(Duration::from_millis(1));
        Self { engine, period }
    }

    /// Fire once immediately, then every period, until `token` is cancelled.
    ///
    /// A cycle already running when cancellation arrives is allowed to finish;
    /// its remote calls are bounded by the engine's timeouts.
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period = ?self.period, table = self.engine.local().table(), "sync scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    report(&self.engine.run_cycle().await);
                }
            }
        }

        info!("sync scheduler stopped");
    }

    /// Run the loop on its own task.
    pub fn spawn(self, token: CancellationToken) -> SchedulerHandle {
        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(self.run(token.clone()));
        SchedulerHandle {
            engine,
            token,
            task,
        }
    }
}

/// Control surface for a spawned [`Scheduler`].
pub struct SchedulerHandle {
    engine: Arc<SyncEngine>,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Manual trigger. Goes through the same entry point as the periodic
    /// tick, so it returns [`SyncOutcome::Busy`] instead of queueing when a
    /// cycle is already in flight.
    pub async fn sync_now(&self) -> AppResult<SyncOutcome> {
        let res = self.engine.run_cycle().await;
        report(&res);
        res
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "sync scheduler task failed");
        }
    }
}

/// Periodic cycles only report through the log.
fn report(res: &AppResult<SyncOutcome>) {
    match res {
        Ok(SyncOutcome::Synced { .. }) => info!(outcome = %describe(res), "sync cycle finished"),
        Ok(SyncOutcome::PushFailed { error, .. }) if error.is_transient() => {
            warn!(outcome = %describe(res), "sync cycle aborted, will retry")
        }
        Ok(SyncOutcome::PushFailed { .. }) => error!(outcome = %describe(res), "sync cycle aborted"),
        Ok(_) => {}
        Err(e) => error!(error = %e, "sync cycle failed"),
    }
}

fn describe(res: &AppResult<SyncOutcome>) -> String {
    match res {
        Ok(o) => o.to_string(),
        Err(e) => e.to_string(),
    }
}
