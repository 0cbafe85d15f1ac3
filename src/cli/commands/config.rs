use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::fs;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            let mut shown = cfg.clone();
            if !shown.remote.password.is_empty() {
                shown.remote.password = "********".to_string();
            }
            let yaml = serde_yaml::to_string(&shown)
                .map_err(|e| AppError::Config(format!("failed to serialize configuration: {e}")))?;
            println!("📄 Current configuration ({}):\n", path.display());
            println!("{yaml}");
        }

        if *check {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {} (defaults in use; run `clocksync init`)",
                    path.display()
                ));
                return Ok(());
            }

            let content = fs::read_to_string(&path)?;
            let missing = Config::missing_fields(&content)?;
            if missing.is_empty() {
                success("Configuration file is complete.");
            } else {
                for key in missing {
                    info(format!("Missing '{}' (default value used)", key));
                }
            }
        }
    }

    Ok(())
}
