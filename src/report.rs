//! Session report and export functionality

use crate::keyboard::{layout, KeyboardState};
use crate::summary::{self, SummaryLine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Error type for report export
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Summary statistics
    pub summary: SessionSummary,
    /// Per-key measurements, sorted by key identifier
    pub keys: Vec<KeyEntry>,
    /// Human-readable overview lines
    pub overview: Vec<ResultEntry>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

/// Session summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Distinct keys pressed since the last reset
    pub keys_activated: usize,
    /// Keys in the drawn layout
    pub layout_keys: usize,
    /// Total qualifying key presses
    pub total_presses: u64,
    /// Highest CPS seen on any key
    pub global_max_cps: f64,
    /// Mean hold latency in ms; absent when nothing was measured
    pub average_latency_ms: Option<f64>,
}

/// Measurements for one key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub code: String,
    pub press_count: u64,
    pub last_latency_ms: Option<f64>,
    pub max_cps: f64,
}

/// Single overview line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub value: String,
    pub status: String,
}

impl From<&SummaryLine> for ResultEntry {
    fn from(line: &SummaryLine) -> Self {
        Self {
            label: line.label.clone(),
            value: line.value.clone(),
            status: line.status.as_str().to_string(),
        }
    }
}

impl SessionReport {
    /// Create a new session report
    pub fn new(start_time: Instant, state: &KeyboardState) -> Self {
        let now: DateTime<Utc> = Utc::now();

        let average_latency_ms = if state.latency_samples() > 0 {
            Some(state.average_latency())
        } else {
            None
        };

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
            },
            summary: SessionSummary {
                keys_activated: state.activated_count(),
                layout_keys: layout::layout_key_count(),
                total_presses: state.total_presses(),
                global_max_cps: state.global_max_cps,
                average_latency_ms,
            },
            keys: state
                .key_stats
                .iter()
                .map(|(code, stats)| KeyEntry {
                    code: code.to_string(),
                    press_count: stats.press_count,
                    last_latency_ms: stats.last_latency,
                    max_cps: stats.max_cps,
                })
                .collect(),
            overview: summary::overview(state).iter().map(ResultEntry::from).collect(),
        }
    }

    /// Default file name for a report generated now
    pub fn default_filename() -> String {
        format!("keypulse_report_{}.json", Utc::now().format("%Y%m%d_%H%M%S"))
    }

    /// Export report to JSON file
    pub fn export_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        log::info!("report written to {}", path.display());
        Ok(())
    }

    /// Export into `dir` under the default file name, returning the path
    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(Self::default_filename());
        self.export_json(&path)?;
        Ok(path)
    }

    /// Export report to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{KeyId, MetricsEngine};
    use std::env;
    use std::fs;

    fn sample_state() -> KeyboardState {
        let mut engine = MetricsEngine::silent();
        let a = KeyId::from("KeyA");
        let b = KeyId::from("KeyB");
        engine.on_key_down(&b, 0.0);
        engine.on_key_up(&b, 120.0);
        engine.on_key_down(&a, 0.0);
        engine.on_key_up(&a, 80.0);
        engine.on_key_down(&a, 250.0);
        engine.snapshot()
    }

    #[test]
    fn report_summarizes_state() {
        let report = SessionReport::new(Instant::now(), &sample_state());

        assert_eq!(report.summary.keys_activated, 2);
        assert_eq!(report.summary.layout_keys, 87);
        assert_eq!(report.summary.total_presses, 3);
        assert_eq!(report.summary.global_max_cps, 4.0);
        assert_eq!(report.summary.average_latency_ms, Some(100.0));
        assert_eq!(report.metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn report_keys_sorted_by_code() {
        let report = SessionReport::new(Instant::now(), &sample_state());
        let codes: Vec<&str> = report.keys.iter().map(|k| k.code.as_str()).collect();
        assert_eq!(codes, vec!["KeyA", "KeyB"]);
        assert_eq!(report.keys[0].press_count, 2);
        assert_eq!(report.keys[1].last_latency_ms, Some(120.0));
    }

    #[test]
    fn empty_report_has_no_average() {
        let report = SessionReport::new(Instant::now(), &KeyboardState::new());
        assert_eq!(report.summary.average_latency_ms, None);
        assert!(report.keys.is_empty());
    }

    #[test]
    fn report_json_parses_back() {
        let report = SessionReport::new(Instant::now(), &sample_state());
        let json = report.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["keys_activated"], 2);
        assert_eq!(value["keys"][0]["code"], "KeyA");
        assert!(value["overview"].as_array().is_some_and(|o| !o.is_empty()));
    }

    #[test]
    fn export_writes_file() {
        let dir = env::temp_dir().join(format!("keypulse-report-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let report = SessionReport::new(Instant::now(), &sample_state());
        let path = report.export_to_dir(&dir).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"global_max_cps\": 4.0"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("keypulse_report_")));

        let _ = fs::remove_dir_all(&dir);
    }
}
