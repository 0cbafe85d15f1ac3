use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Correct a record that the sync engine keeps skipping for a missing
/// employee id.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Fix { id, employee } = cmd {
        let store = open_store(cfg)?;
        store.update_employee(*id, *employee)?;
        success(format!("Record {} now belongs to employee {}", id, employee));
    }
    Ok(())
}
