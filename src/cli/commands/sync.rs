use crate::cli::commands::build_engine;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::sync::{SyncEngine, SyncOutcome};
use crate::db::store::LocalStore;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

/// Handle `sync <local_db> <table>`: exactly one cycle.
///
/// Only local storage failures are errors. Whatever happened on the remote
/// side was rolled back and is retried by the next cycle.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync { local_db, table } = cmd {
        let path = LocalStore::resolve_path(local_db);
        let engine = build_engine(cfg, &path, table)?;

        run_once(&engine).await?;
    }

    Ok(())
}

/// Run one cycle and print its result. A failed push is reported, not
/// returned as an error.
pub async fn run_once(engine: &SyncEngine) -> AppResult<SyncOutcome> {
    let outcome = engine.run_cycle().await?;
    report(&outcome);
    Ok(outcome)
}

fn report(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::Synced { .. } => success(outcome),
        SyncOutcome::PushFailed { error, .. } if !error.is_transient() => {
            warning(format!("{outcome} (records kept locally; fix the data and sync again)"))
        }
        SyncOutcome::Unreachable
        | SyncOutcome::NoValidRecords { .. }
        | SyncOutcome::PushFailed { .. } => warning(outcome),
        _ => info(outcome),
    }
}
