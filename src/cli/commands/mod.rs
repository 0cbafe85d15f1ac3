pub mod clock;
pub mod config;
pub mod del;
pub mod fix;
pub mod init;
pub mod list;
pub mod log;
pub mod status;
pub mod sync;
pub mod watch;

use crate::config::Config;
use crate::core::sync::SyncEngine;
use crate::db::store::LocalStore;
use crate::errors::AppResult;
use crate::remote::PgRemote;
use std::path::Path;
use std::sync::Arc;

/// The configured local store (after any `--db` override).
pub(crate) fn open_store(cfg: &Config) -> AppResult<LocalStore> {
    LocalStore::open(&cfg.database, &cfg.table)
}

/// Wire a sync engine for `table` of the database at `db_path`.
pub(crate) fn build_engine(cfg: &Config, db_path: &Path, table: &str) -> AppResult<SyncEngine> {
    let local = LocalStore::open(db_path, table)?;
    let remote = PgRemote::new(&cfg.remote.pg_params(), table)?;
    Ok(SyncEngine::new(local, Arc::new(remote), cfg.sync_settings()))
}
