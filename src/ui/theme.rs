//! Theme color definitions for the UI
//!
//! Provides dark and light color palettes that can be switched at runtime.

use crate::config::Theme;
use crate::keyboard::KeyStatus;
use ratatui::style::Color;

/// Complete color palette for the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    /// Main background
    pub bg: Color,
    /// Primary foreground text
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (headings, active tab)
    pub accent: Color,
    /// Success / OK status
    pub green: Color,
    /// Warning status
    pub yellow: Color,
    /// Reset button and errors
    pub red: Color,
    /// Speed readouts
    pub cps: Color,
    /// Latency readouts
    pub latency: Color,
    /// Untested key background
    pub key_off: Color,
    /// Pressed key background
    pub key_on: Color,
    /// Previously pressed key background
    pub key_used: Color,
    /// Untested key label
    pub key_text: Color,
    /// Pressed key label
    pub key_text_on: Color,
    /// Previously pressed key label
    pub key_text_used: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(15, 23, 42),
            fg: Color::Rgb(226, 232, 240),
            dim: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(16, 185, 129),
            green: Color::Rgb(52, 211, 153),
            yellow: Color::Rgb(251, 191, 36),
            red: Color::Rgb(248, 113, 113),
            cps: Color::Rgb(96, 165, 250),
            latency: Color::Rgb(251, 146, 60),
            key_off: Color::Rgb(30, 41, 59),
            key_on: Color::Rgb(16, 185, 129),
            key_used: Color::Rgb(51, 65, 85),
            key_text: Color::Rgb(148, 163, 184),
            key_text_on: Color::Rgb(255, 255, 255),
            key_text_used: Color::Rgb(52, 211, 153),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(248, 250, 252),
            fg: Color::Rgb(15, 23, 42),
            dim: Color::Rgb(100, 116, 139),
            accent: Color::Rgb(5, 150, 105),
            green: Color::Rgb(5, 150, 105),
            yellow: Color::Rgb(180, 120, 0),
            red: Color::Rgb(200, 50, 60),
            cps: Color::Rgb(37, 99, 235),
            latency: Color::Rgb(234, 88, 12),
            key_off: Color::Rgb(226, 232, 240),
            key_on: Color::Rgb(5, 150, 105),
            key_used: Color::Rgb(203, 213, 225),
            key_text: Color::Rgb(71, 85, 105),
            key_text_on: Color::Rgb(255, 255, 255),
            key_text_used: Color::Rgb(4, 120, 87),
        }
    }

    /// Background and label colors for a key in the given status
    pub fn key_colors(&self, status: KeyStatus) -> (Color, Color) {
        match status {
            KeyStatus::Pressed => (self.key_on, self.key_text_on),
            KeyStatus::Released => (self.key_used, self.key_text_used),
            KeyStatus::Untested => (self.key_off, self.key_text),
        }
    }
}
