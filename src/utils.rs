use chrono::{DateTime, Utc};

/// format a timestamp as a rough "time ago" label
pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    time_ago_from(timestamp, Utc::now())
}

fn time_ago_from(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days >= 365 {
        format!("{}y ago", days / 365)
    } else if days >= 30 {
        format!("{}mo ago", days / 30)
    } else if days >= 7 {
        format!("{}w ago", days / 7)
    } else if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}

/// quote a path for the emitted `cd` line, POSIX single-quote rules
pub fn shell_single_quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', "'\"'\"'"))
}

/// truncate a string to a maximum length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
