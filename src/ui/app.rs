//! Main application state and logic

use super::ThemeColors;
use crate::config::Config;
use crate::feedback::ClickFeedback;
use crate::keyboard::{KeyEvent, KeyboardState, MetricsEngine, Platform};
use crate::report::{ReportError, SessionReport};
use crate::summary::{self, SummaryLine};
use crate::utils::format_elapsed;
use std::path::PathBuf;
use std::time::Instant;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Keyboard,
    Stats,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyboard => "Keyboard",
            Self::Stats => "Stats",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[Self::Keyboard, Self::Stats, Self::Help]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Keyboard => 0,
            Self::Stats => 1,
            Self::Help => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Keyboard,
            1 => Self::Stats,
            _ => Self::Help,
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Paused,
    Quitting,
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// Keycap labels in use
    pub platform: Platform,
    /// Application start time
    pub start_time: Instant,
    /// Total events processed
    pub total_events: u64,
    engine: MetricsEngine,
    status_message: Option<String>,
    status_time: Option<Instant>,
}

impl App {
    pub fn new(config: Config, feedback: Box<dyn ClickFeedback>) -> Self {
        let mut engine = MetricsEngine::new(feedback);
        engine.set_muted(!config.sound.enabled);
        Self {
            view: AppView::Keyboard,
            state: AppState::Running,
            platform: config.ui.platform,
            config,
            start_time: Instant::now(),
            total_events: 0,
            engine,
            status_message: None,
            status_time: None,
        }
    }

    /// Latest keyboard snapshot
    pub fn keyboard_state(&self) -> &KeyboardState {
        self.engine.state()
    }

    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_theme(self.config.ui.theme)
    }

    pub fn sound_enabled(&self) -> bool {
        !self.engine.is_muted()
    }

    /// Feed a keyboard event to the metrics engine
    pub fn process_event(&mut self, event: &KeyEvent) {
        if self.state != AppState::Running {
            return;
        }

        self.total_events += 1;
        self.engine.process_event(event);
    }

    /// The terminal lost input focus
    pub fn focus_lost(&mut self) {
        self.engine.on_focus_lost();
    }

    /// Switch to the next view
    pub fn next_view(&mut self) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.view = AppView::from_index(next);
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self) {
        let len = AppView::all().len();
        let prev = (self.view.index() + len - 1) % len;
        self.view = AppView::from_index(prev);
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            AppState::Running => {
                // Releases are dropped while paused, so nothing held can be trusted.
                self.engine.on_focus_lost();
                self.set_status("Paused".to_string());
                AppState::Paused
            }
            AppState::Paused => {
                self.set_status("Resumed".to_string());
                AppState::Running
            }
            AppState::Quitting => AppState::Quitting,
        };
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Forget every key and statistic
    pub fn reset(&mut self) {
        self.engine.reset();
        self.total_events = 0;
        self.set_status("All keys reset".to_string());
    }

    pub fn toggle_sound(&mut self) {
        let muted = !self.engine.is_muted();
        self.engine.set_muted(muted);
        self.set_status(if muted { "Sound off" } else { "Sound on" }.to_string());
    }

    pub fn toggle_platform(&mut self) {
        self.platform = self.platform.toggled();
        self.set_status(format!("{} labels", self.platform.name()));
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Get status message if it has not expired yet
    pub fn get_status(&self) -> Option<&str> {
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if time.elapsed() < self.config.status_duration() => Some(msg),
            _ => None,
        }
    }

    /// Lines for the current view
    pub fn current_results(&self) -> Vec<SummaryLine> {
        match self.view {
            AppView::Keyboard => summary::overview(self.engine.state()),
            AppView::Stats => super::key_table_lines(self.engine.state()),
            AppView::Help => Vec::new(),
        }
    }

    /// Get elapsed time formatted
    pub fn elapsed_formatted(&self) -> String {
        format_elapsed(self.start_time.elapsed().as_secs())
    }

    /// Generate a session report
    pub fn generate_report(&self) -> SessionReport {
        SessionReport::new(self.start_time, self.engine.state())
    }

    /// Export session report to the configured directory
    pub fn export_report(&self) -> Result<PathBuf, ReportError> {
        self.generate_report().export_to_dir(&self.config.report_dir())
    }

    /// Export and report the outcome in the status bar
    pub fn export(&mut self) {
        match self.export_report() {
            Ok(path) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => {
                log::error!("report export failed: {}", e);
                self.set_status(format!("Export failed: {}", e));
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default(), Box::new(crate::feedback::Silent))
    }
}
