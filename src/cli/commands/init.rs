use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::db::store::LocalStore;
use crate::errors::AppResult;
use crate::remote::PgRemote;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the local SQLite database and attendance table
///  - optionally, the attendance table on the remote server
pub async fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Init { remote } = &cli.command else {
        return Ok(());
    };

    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;
    if !cli.test {
        success(format!("Config file : {}", Config::config_file().display()));
    }

    let store = LocalStore::open(&db_path, &cfg.table)?;
    success(format!(
        "Database    : {} (table '{}')",
        db_path.display(),
        store.table()
    ));

    if let Err(e) = store.record_log(
        "init",
        &format!("Database initialized at {}", db_path.display()),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    if *remote {
        let pg = PgRemote::new(&cfg.remote.pg_params(), &cfg.table)?;
        pg.ensure_table().await?;
        success(format!(
            "Remote table '{}' ready on {}:{}/{}",
            cfg.table, cfg.remote.host, cfg.remote.port, cfg.remote.database
        ));
    }

    Ok(())
}
