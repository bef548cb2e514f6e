//! Configuration management for KeyPulse
//!
//! Settings are read from a platform-specific TOML file. A missing file
//! means defaults; the metrics themselves are never stored there.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keypulse/config.toml` |
//! | macOS | `~/Library/Application Support/keypulse/config.toml` |
//! | Windows | `%APPDATA%\keypulse\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keypulse::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.sound.enabled = false;
//! config.save().expect("Failed to save config");
//! ```

use crate::keyboard::Platform;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Directory holding the config file, created on demand
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let app_dir = dirs::config_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join("keypulse");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir)
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// UI settings
    #[serde(default)]
    pub ui: UiConfig,
    /// Click feedback settings
    #[serde(default)]
    pub sound: SoundConfig,
    /// Input source selection
    #[serde(default)]
    pub input: InputConfig,
    /// Report export settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Refresh rate for UI updates (in Hz)
    pub refresh_rate_hz: u32,
    /// How long status messages stay visible, in seconds
    pub warning_duration_secs: u32,
    /// Color theme (dark/light)
    pub theme: Theme,
    /// Keycap label set shown at startup
    #[serde(default)]
    pub platform: Platform,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            warning_duration_secs: 3,
            theme: Theme::Dark,
            platform: Platform::Windows,
        }
    }
}

/// Color theme options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Click feedback configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoundConfig {
    /// Ring the terminal bell on every fresh key press
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Which keyboard listener to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum InputBackend {
    /// evdev on Linux when accessible, otherwise device_query
    #[default]
    Auto,
    /// Raw evdev only (Linux); startup fails when no device can be read
    Evdev,
    /// device_query polling only
    DeviceQuery,
}

impl InputBackend {
    /// Whether the evdev listener should be tried
    pub fn wants_evdev(self) -> bool {
        matches!(self, Self::Auto | Self::Evdev)
    }

    /// Whether device_query may stand in when evdev is unavailable
    pub fn allows_fallback(self) -> bool {
        !matches!(self, Self::Evdev)
    }
}

/// Input configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    pub backend: InputBackend,
}

/// Report export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Where exported reports go; the working directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get UI refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.ui.refresh_rate_hz.max(1)))
    }

    /// How long a status message stays on screen
    pub fn status_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.ui.warning_duration_secs))
    }

    /// Directory that exported reports are written to
    pub fn report_dir(&self) -> PathBuf {
        self.report
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
