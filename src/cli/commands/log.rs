use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, RESET};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let store = open_store(cfg)?;
        let entries = store.load_log(*limit)?;

        if entries.is_empty() {
            println!("Internal log is empty.");
            return Ok(());
        }

        let mut table = Table::new(["DATE", "OPERATION", "TARGET", "MESSAGE"]);
        for e in entries {
            table.add_row(vec![
                e.date,
                format!("{CYAN}{}{RESET}", e.operation),
                e.target,
                e.message,
            ]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
