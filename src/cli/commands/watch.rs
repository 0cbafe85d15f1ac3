use crate::cli::commands::build_engine;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::scheduler::Scheduler;
use crate::errors::AppResult;
use crate::shutdown::install_signal_handler;
use crate::ui::messages::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Run the periodic scheduler in the foreground until Ctrl+C / SIGTERM.
pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { interval } = cmd {
        let period = interval
            .map(|s| Duration::from_secs(s.max(1)))
            .unwrap_or_else(|| cfg.sync_interval());

        let engine = build_engine(cfg, Path::new(&cfg.database), &cfg.table)?;
        info(format!(
            "Syncing '{}' every {}s (Ctrl+C to stop)",
            cfg.table,
            period.as_secs()
        ));

        let token = install_signal_handler();
        Scheduler::new(Arc::new(engine), period).run(token).await;
    }
    Ok(())
}
