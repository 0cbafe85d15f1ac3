use clap::{Parser, Subcommand};

/// Command-line interface definition for clocksync
/// Offline-first clock-in/clock-out tracking with PostgreSQL sync
#[derive(Parser)]
#[command(
    name = "clocksync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Record employee clock-in/clock-out events locally and sync them to a central PostgreSQL server",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the local database
    Init {
        #[arg(long = "remote", help = "Also create the table on the remote server")]
        remote: bool,
    },

    /// Run one sync cycle for a local database table
    Sync {
        /// Local database (a path, or a bare name resolved to <name>.db)
        local_db: String,

        /// Attendance table to drain
        table: String,
    },

    /// Record a clock-in
    ClockIn {
        employee_id: i64,

        #[arg(long = "at", help = "Timestamp (YYYY-MM-DD HH:MM[:SS] or HH:MM for today)")]
        at: Option<String>,
    },

    /// Close the latest open clock-in of an employee
    ClockOut {
        employee_id: i64,

        #[arg(long = "at", help = "Timestamp (YYYY-MM-DD HH:MM[:SS] or HH:MM for today)")]
        at: Option<String>,
    },

    /// List local records
    List {
        #[arg(long = "employee", help = "Only records of this employee")]
        employee: Option<i64>,

        #[arg(long = "from", help = "First clock-in date (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long = "to", help = "Last clock-in date (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long = "unsynced", help = "Only records not yet on the server")]
        unsynced: bool,

        #[arg(long = "desc", help = "Newest first")]
        desc: bool,

        #[arg(long = "json", help = "Print records as JSON")]
        json: bool,
    },

    /// Correct the employee id of a record that has not been synced yet
    Fix {
        id: i64,

        #[arg(long = "employee")]
        employee: i64,
    },

    /// Delete a local record by ID
    Del {
        id: i64,

        #[arg(long = "force", help = "Also delete a record that is not on the server yet")]
        force: bool,
    },

    /// Show local queue size and remote reachability
    Status,

    /// Sync periodically until interrupted
    Watch {
        #[arg(long = "interval", help = "Seconds between sync cycles (default: from config)")]
        interval: Option<u64>,
    },

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long = "limit", default_value_t = 50)]
        limit: usize,
    },
}
