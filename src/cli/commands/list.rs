use crate::cli::commands::open_store;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::queries::EventFilter;
use crate::errors::{AppError, AppResult};
use crate::models::event::Event;
use crate::utils::colors::{colorize_optional, colorize_synced};
use crate::utils::date::parse_optional_date;
use crate::utils::formatting::{fmt_duration, fmt_opt_i64, fmt_ts};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        employee,
        from,
        to,
        unsynced,
        desc,
        json,
    } = cmd
    {
        let filter = EventFilter {
            employee_id: *employee,
            from: parse_optional_date(from.as_ref())?,
            to: parse_optional_date(to.as_ref())?,
            unsynced_only: *unsynced,
            descending: *desc,
        };

        let store = open_store(cfg)?;
        let events = store.fetch_filtered(&filter)?;

        if *json {
            let out = serde_json::to_string_pretty(&events)
                .map_err(|e| AppError::Other(format!("JSON encoding failed: {e}")))?;
            println!("{out}");
            return Ok(());
        }

        if events.is_empty() {
            println!("No records found.");
            return Ok(());
        }

        print_events(&events);
    }
    Ok(())
}

fn print_events(events: &[Event]) {
    let mut table = Table::new(["ID", "EMPLOYEE", "CLOCK IN", "CLOCK OUT", "WORKED", "SYNCED"]);

    for ev in events {
        table.add_row(vec![
            ev.id.to_string(),
            colorize_optional(&fmt_opt_i64(ev.employee_id)),
            colorize_optional(&fmt_ts(ev.clock_in)),
            colorize_optional(&fmt_ts(ev.clock_out)),
            colorize_optional(&fmt_duration(ev.clock_in, ev.clock_out)),
            colorize_synced(ev.synced),
        ]);
    }

    print!("{}", table.render());
    println!("{} record(s)", events.len());
}
