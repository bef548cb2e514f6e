//! Labelled summary lines derived from a keyboard snapshot
//!
//! Shared by the stats panels and the exported report so both describe a
//! session the same way.

use crate::keyboard::{layout, KeyId, KeyStats, KeyboardState};
use crate::utils::{format_cps, format_latency};

/// Hold latency above which a key is flagged
pub const SLOW_HOLD_MS: f64 = 250.0;

/// A single summary entry
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
    pub status: LineStatus,
}

impl SummaryLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: LineStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, LineStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, LineStatus::Warning)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, LineStatus::Info)
    }
}

/// Status of a summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Ok,
    Warning,
    Info,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Session-wide figures
pub fn overview(state: &KeyboardState) -> Vec<SummaryLine> {
    let total = layout::layout_key_count();
    let tested_in_layout = state
        .activated_keys
        .iter()
        .filter(|k| layout::find_key(k).is_some())
        .count();

    let coverage = if tested_in_layout == total {
        SummaryLine::ok("Keys Active", format!("{} / {}", state.activated_count(), total))
    } else {
        SummaryLine::info("Keys Active", format!("{} / {}", state.activated_count(), total))
    };

    let mut lines = vec![
        coverage,
        SummaryLine::info("Total Presses", state.total_presses().to_string()),
        SummaryLine::info("Max Speed", format!("{} CPS", format_cps(state.global_max_cps))),
    ];

    let avg = if state.latency_samples() > 0 {
        Some(state.average_latency())
    } else {
        None
    };
    lines.push(SummaryLine::info("Avg Latency", format_latency(avg)));

    lines.push(SummaryLine::info(
        "Last Code",
        state
            .last_key_pressed
            .as_ref()
            .map(KeyId::to_string)
            .unwrap_or_else(|| "--".to_string()),
    ));

    if !state.pressed_keys.is_empty() {
        let held: Vec<&str> = state.pressed_keys.iter().map(KeyId::as_str).collect();
        lines.push(SummaryLine::info("Held", held.join(" ")));
    }

    let untested = total - tested_in_layout;
    if untested > 0 && tested_in_layout > 0 {
        lines.push(SummaryLine::warning("Untested", format!("{} key(s)", untested)));
    }

    lines
}

/// One line per activated key, busiest first
pub fn per_key(state: &KeyboardState) -> Vec<SummaryLine> {
    let mut entries: Vec<(&KeyId, &KeyStats)> = state.key_stats.iter().collect();
    entries.sort_by(|a, b| b.1.press_count.cmp(&a.1.press_count).then_with(|| a.0.cmp(b.0)));

    entries
        .into_iter()
        .map(|(key, stats)| {
            let value = format!(
                "{:>5} presses  hold {:>6}  max {:>5} CPS",
                stats.press_count,
                format_latency(stats.last_latency),
                format_cps(stats.max_cps),
            );
            match stats.last_latency {
                Some(ms) if ms > SLOW_HOLD_MS => SummaryLine::warning(key.as_str(), value),
                _ if state.is_pressed(key) => SummaryLine::ok(key.as_str(), value),
                _ => SummaryLine::info(key.as_str(), value),
            }
        })
        .collect()
}
