/// Formats elapsed seconds as `H:MM:SS` once an hour is reached, otherwise `M:SS`.
///
/// Fractional seconds are truncated. Negative or non-finite input renders as `0:00`.
pub(crate) fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
