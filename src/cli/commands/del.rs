use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, force } = cmd {
        let store = open_store(cfg)?;
        store.delete_one(*id, *force)?;
        info(format!("Deleted record {}", id));
    }
    Ok(())
}
