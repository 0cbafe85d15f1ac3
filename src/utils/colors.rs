/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Grey for placeholder values ("--"), unchanged otherwise.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

/// Green check for synced rows, yellow marker for rows still queued.
pub fn colorize_synced(synced: bool) -> String {
    if synced {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{YELLOW}pending{RESET}")
    }
}
