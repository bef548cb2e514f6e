//! Shared formatting helpers

/// Format a hold latency in whole milliseconds, `--` when absent.
///
/// # Example
///
/// ```
/// use keypulse::utils::format_latency;
///
/// assert_eq!(format_latency(Some(79.6)), "80ms");
/// assert_eq!(format_latency(None), "--");
/// ```
pub fn format_latency(latency_ms: Option<f64>) -> String {
    match latency_ms {
        Some(ms) => format!("{}ms", ms.round() as i64),
        None => "--".to_string(),
    }
}

/// Format a presses-per-second figure with one decimal
pub fn format_cps(cps: f64) -> String {
    format!("{:.1}", cps)
}

/// Format seconds as `MM:SS`
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Truncate a label to at most `width` characters
pub fn fit_label(label: &str, width: usize) -> String {
    label.chars().take(width).collect()
}
