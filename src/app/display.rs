use chrono::{DateTime, Local};

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}

/// Local wall-clock rendering of a Unix-millisecond timestamp.
pub(crate) fn format_watched_at(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M %:z")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn format_episode_position(current: u32, total: u32) -> String {
    if total <= 1 {
        return "Full".to_string();
    }
    format!("Episode {current} / {total}")
}

pub(crate) fn format_progress_percent(progress: f64) -> String {
    if !progress.is_finite() {
        return "0%".to_string();
    }
    format!("{:.0}%", progress.clamp(0.0, 1.0) * 100.0)
}
