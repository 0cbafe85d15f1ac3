//! Formatting utilities used for CLI outputs.

use chrono::NaiveDateTime;

pub fn fmt_ts(ts: Option<NaiveDateTime>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "--".to_string(),
    }
}

pub fn fmt_opt_i64(v: Option<i64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_else(|| "--".to_string())
}

/// Worked time between two timestamps, e.g. `07h 45m`.
pub fn fmt_duration(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> String {
    match (start, end) {
        (Some(s), Some(e)) if e >= s => {
            let mins = (e - s).num_minutes();
            format!("{:02}h {:02}m", mins / 60, mins % 60)
        }
        _ => "--".to_string(),
    }
}
