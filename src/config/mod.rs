//! YAML configuration for the command-line collaborator.
//!
//! Only the CLI reads this; the sync engine and adapters receive plain
//! values built from it.

use crate::core::sync::{DEFAULT_BATCH_SIZE, SyncSettings};
use crate::db::store::DEFAULT_TABLE;
use crate::errors::{AppError, AppResult};
use crate::models::policy::ReconcilePolicy;
use crate::remote::postgres::PgParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables overriding the `remote` block.
pub const ENV_PG_HOST: &str = "CLOCKSYNC_PG_HOST";
pub const ENV_PG_PORT: &str = "CLOCKSYNC_PG_PORT";
pub const ENV_PG_DATABASE: &str = "CLOCKSYNC_PG_DATABASE";
pub const ENV_PG_USER: &str = "CLOCKSYNC_PG_USER";
pub const ENV_PG_PASSWORD: &str = "CLOCKSYNC_PG_PASSWORD";

const TOP_LEVEL_KEYS: [&str; 6] = [
    "database",
    "table",
    "batch_size",
    "sync_interval_secs",
    "reconcile_policy",
    "remote",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
    #[serde(default)]
    pub reconcile_policy: ReconcilePolicy,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_sync_interval() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "employee_tracker".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            connect_timeout_secs: 5,
            query_timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            table: default_table(),
            batch_size: default_batch_size(),
            sync_interval_secs: default_sync_interval(),
            reconcile_policy: ReconcilePolicy::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl RemoteConfig {
    /// Apply `CLOCKSYNC_PG_*` overrides on top of the file values.
    pub fn apply_env(&mut self) -> AppResult<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PG_HOST) {
            self.host = v;
        }
        if let Some(v) = lookup(ENV_PG_PORT) {
            self.port = v
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{ENV_PG_PORT} is not a valid port: {v}")))?;
        }
        if let Some(v) = lookup(ENV_PG_DATABASE) {
            self.database = v;
        }
        if let Some(v) = lookup(ENV_PG_USER) {
            self.user = v;
        }
        if let Some(v) = lookup(ENV_PG_PASSWORD) {
            self.password = v;
        }
        Ok(())
    }

    pub fn pg_params(&self) -> PgParams {
        PgParams {
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            statement_timeout: Duration::from_secs(self.query_timeout_secs.max(1)),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("clocksync")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".clocksync")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("clocksync.conf")
    }

    /// Return the default path of the local SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("employee_tracker.db")
    }

    /// Load configuration from file (or defaults if there is none), then
    /// apply environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::load_from(&Self::config_file())?;
        cfg.remote.apply_env()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("failed to parse configuration: {e}")))
    }

    /// Top-level keys absent from a configuration file (filled by defaults).
    pub fn missing_fields(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("failed to parse configuration: {e}")))?;
        let map = value
            .as_mapping()
            .ok_or_else(|| AppError::Config("configuration is not a YAML mapping".to_string()))?;

        Ok(TOP_LEVEL_KEYS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect())
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            batch_size: self.batch_size,
            remote_timeout: Duration::from_secs(self.remote.query_timeout_secs.max(1)),
            probe_timeout: Duration::from_secs(self.remote.connect_timeout_secs.max(1)),
            policy: self.reconcile_policy,
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    /// Write the configuration file (unless `is_test`) and return the
    /// database path it points to.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() { p.to_path_buf() } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            let config = Config {
                database: db_path.to_string_lossy().to_string(),
                ..Config::default()
            };
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Config(format!("failed to serialize configuration: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        Ok(db_path)
    }
}
