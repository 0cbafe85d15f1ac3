use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::event::NewEvent;
use crate::ui::messages::success;
use crate::utils::time::timestamp_or_now;

/// Handle `clock-in` and `clock-out`.
///
/// Events are always written locally first; the scheduler or a manual
/// `sync` forwards them later.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::ClockIn { employee_id, at } => {
            let at = timestamp_or_now(at.as_ref())?;
            let store = open_store(cfg)?;
            let id = store.insert(&NewEvent::clock_in(*employee_id, at))?;
            success(format!(
                "Clock-in recorded for employee {} at {} (record {})",
                employee_id,
                at.format("%Y-%m-%d %H:%M:%S"),
                id
            ));
        }
        Commands::ClockOut { employee_id, at } => {
            let at = timestamp_or_now(at.as_ref())?;
            let store = open_store(cfg)?;
            let id = store.clock_out(*employee_id, at)?;
            success(format!(
                "Clock-out recorded for employee {} at {} (record {})",
                employee_id,
                at.format("%Y-%m-%d %H:%M:%S"),
                id
            ));
        }
        _ => {}
    }

    Ok(())
}
