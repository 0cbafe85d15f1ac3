//! Cheap connectivity check run before every sync cycle.

use super::RemoteStore;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tracing::{debug, info};

const UNKNOWN: u8 = 0;
const UP: u8 = 1;
const DOWN: u8 = 2;

/// Wraps [`RemoteStore::ping`] in a timeout and reports a plain boolean.
///
/// Transitions between reachable and unreachable are logged at `info`; a
/// steady state only at `debug`, so an offline client polling every few
/// seconds does not flood the log.
#[derive(Debug)]
pub struct ReachabilityProbe {
    timeout: Duration,
    last: AtomicU8,
}

impl ReachabilityProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last: AtomicU8::new(UNKNOWN),
        }
    }

    pub async fn is_reachable(&self, remote: &dyn RemoteStore) -> bool {
        let up = tokio::time::timeout(self.timeout, remote.ping())
            .await
            .unwrap_or(false);

        let now = if up { UP } else { DOWN };
        let before = self.last.swap(now, Ordering::AcqRel);
        if before != now {
            if up {
                info!("remote store is reachable");
            } else {
                info!(timeout = ?self.timeout, "remote store is unreachable");
            }
        } else {
            debug!(reachable = up, "reachability unchanged");
        }

        up
    }
}
