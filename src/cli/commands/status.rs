use crate::cli::commands::open_store;
use crate::config::Config;
use crate::errors::AppResult;
use crate::remote::{PgRemote, ReachabilityProbe};
use crate::ui::messages::field;
use crate::utils::colors::{GREEN, RED, RESET};
use std::path::Path;

pub async fn handle(cfg: &Config) -> AppResult<()> {
    let store = open_store(cfg)?;
    let counts = store.counts()?;

    let remote = PgRemote::new(&cfg.remote.pg_params(), &cfg.table)?;
    let probe = ReachabilityProbe::new(cfg.sync_settings().probe_timeout);
    let reachable = probe.is_reachable(&remote).await;

    field("Database", Path::new(&cfg.database).display());
    field("Table", &cfg.table);
    field("Records", counts.total);
    field("Unsynced", counts.unsynced);
    field(
        "Remote",
        format!(
            "{}:{}/{} {}",
            cfg.remote.host,
            cfg.remote.port,
            cfg.remote.database,
            if reachable {
                format!("{GREEN}reachable{RESET}")
            } else {
                format!("{RED}unreachable{RESET}")
            }
        ),
    );
    field("Reconcile", cfg.reconcile_policy);

    Ok(())
}
