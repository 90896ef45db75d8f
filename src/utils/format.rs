//! Countdown text formatting

/// Format seconds as `H hr  M min  S sec`, dropping any fraction
pub fn format_remaining(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{} hr  {} min  {} sec", hours, minutes, seconds)
}
