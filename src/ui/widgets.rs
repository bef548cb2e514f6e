//! Custom TUI widgets

use super::ThemeColors;
use crate::keyboard::{layout, KeyboardState, Platform};
use crate::summary::{LineStatus, SummaryLine};
use crate::utils::format_cps;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Widget for displaying summary lines
pub struct ResultsPanel<'a> {
    lines: &'a [SummaryLine],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(lines: &'a [SummaryLine], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            lines,
            title,
            colors,
        }
    }

    fn status_color(&self, status: LineStatus) -> Color {
        match status {
            LineStatus::Ok => self.colors.green,
            LineStatus::Warning => self.colors.yellow,
            LineStatus::Info => self.colors.accent,
        }
    }

    fn status_symbol(status: LineStatus) -> &'static str {
        match status {
            LineStatus::Ok => "[OK]",
            LineStatus::Warning => "[!!]",
            LineStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.lines.is_empty() {
            buf.set_string(
                inner.x,
                inner.y,
                " Press any key to start testing!",
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        let label_width = self
            .lines
            .iter()
            .map(|l| l.label.chars().count())
            .max()
            .unwrap_or(0);

        for (line, y) in self.lines.iter().zip(inner.y..inner.y + inner.height) {
            let color = self.status_color(line.status);
            let row = Line::from(vec![
                Span::styled(
                    format!("{} ", Self::status_symbol(line.status)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!("{:<w$}  ", line.label, w = label_width),
                    Style::default().fg(self.colors.fg).add_modifier(Modifier::BOLD),
                ),
                Span::styled(line.value.as_str(), Style::default().fg(color)),
            ]);
            buf.set_line(inner.x, y, &row, inner.width);
        }
    }
}

/// The four headline figures plus sound and reset hints
pub struct StatusPanel<'a> {
    state: &'a KeyboardState,
    sound_enabled: bool,
    platform: Platform,
    colors: ThemeColors,
}

impl<'a> StatusPanel<'a> {
    pub fn new(
        state: &'a KeyboardState,
        sound_enabled: bool,
        platform: Platform,
        colors: ThemeColors,
    ) -> Self {
        Self {
            state,
            sound_enabled,
            platform,
            colors,
        }
    }

    fn tile(&self, buf: &mut Buffer, area: Rect, title: &str, value: &str, unit: &str, color: Color) {
        if area.height < 2 {
            return;
        }
        buf.set_string(
            area.x,
            area.y,
            title.to_uppercase(),
            Style::default().fg(self.colors.dim).add_modifier(Modifier::BOLD),
        );
        let line = Line::from(vec![
            Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {}", unit), Style::default().fg(self.colors.dim)),
        ]);
        buf.set_line(area.x, area.y + 1, &line, area.width);
    }
}

/// Average latency readout, `--` until a hold has been measured
fn average_latency_text(state: &KeyboardState) -> String {
    if state.latency_samples() > 0 {
        format!("{}", state.average_latency().round() as i64)
    } else {
        "--".to_string()
    }
}

impl<'a> Widget for StatusPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(self.colors.dim));
        let inner = block.inner(area);
        block.render(area, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 5),
                Constraint::Ratio(1, 5),
                Constraint::Ratio(1, 5),
                Constraint::Ratio(1, 5),
                Constraint::Ratio(1, 5),
            ])
            .split(inner);

        let keys_active = self.state.activated_count().to_string();
        let layout_total = format!("/ {}", layout::layout_key_count());
        self.tile(buf, columns[0], "Keys Active", &keys_active, &layout_total, self.colors.green);

        let max_speed = format_cps(self.state.global_max_cps);
        self.tile(buf, columns[1], "Max Speed", &max_speed, "CPS", self.colors.cps);

        let latency = average_latency_text(self.state);
        self.tile(buf, columns[2], "Avg Latency", &latency, "ms", self.colors.latency);

        let last = self
            .state
            .last_key_pressed
            .as_ref()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "--".to_string());
        self.tile(buf, columns[3], "Last Code", &last, "", self.colors.fg);

        let sound = if self.sound_enabled { "Sound" } else { "Muted" };
        let sound_color = if self.sound_enabled {
            self.colors.green
        } else {
            self.colors.dim
        };
        self.tile(buf, columns[4], self.platform.name(), sound, "[s]", sound_color);
    }
}

/// Per-key table for the stats view
pub fn key_table_lines(state: &KeyboardState) -> Vec<SummaryLine> {
    let mut lines = crate::summary::overview(state);
    lines.push(SummaryLine::info("", ""));
    lines.extend(crate::summary::per_key(state));
    lines
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Help - KeyPulse ")
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(self.colors.accent));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = [
            "",
            " CONTROLS",
            " -----------",
            " Tab / Shift+Tab  : Switch between views",
            " Space            : Pause/Resume measuring",
            " r                : Reset all keys and statistics",
            " s                : Toggle click sound",
            " p                : Toggle Windows / MacOS labels",
            " e                : Export report to JSON",
            " ?                : Show this help",
            " q / Esc          : Quit application",
            "",
            " METRICS",
            " -----------",
            " ms               : Hold duration of the last press",
            " CPS              : Presses per second between two presses of a key",
            "",
            " KEY COLORS",
            " -----------",
            " Pressed / History / Untested",
        ];

        for (line, y) in help_text.iter().zip(inner.y..inner.y + inner.height) {
            let style = if line.contains("---") {
                Style::default().fg(self.colors.dim)
            } else if line.len() > 1 && line[1..].chars().all(|c| c.is_uppercase() || c == ' ') {
                Style::default().fg(self.colors.yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            buf.set_string(inner.x, y, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    state: &'a str,
    view: &'a str,
    elapsed: &'a str,
    events: u64,
    message: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a str, view: &'a str, elapsed: &'a str, events: u64) -> Self {
        Self {
            state,
            view,
            elapsed,
            events,
            message: None,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        buf.set_style(area, bg_style);

        let left = format!(" {} | {} ", self.state, self.view);
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        if let Some(msg) = self.message {
            let msg_style = bg_style.fg(Color::Yellow);
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, msg_style);
        }

        let right = format!(" {} | Events: {} ", self.elapsed, self.events);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize) -> Self {
        Self { tabs, selected }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(Color::DarkGray));
        let mut x = area.x;

        for (i, tab) in self.tabs.iter().enumerate() {
            let style = if i == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };

            let label = format!(" {} ", tab);
            let width = label.len() as u16;
            if x + width > area.x + area.width {
                break;
            }
            buf.set_string(x, area.y, &label, style);
            x += width;

            if i + 1 < self.tabs.len() && x < area.x + area.width {
                buf.set_string(x, area.y, "|", Style::default().fg(Color::Gray).bg(Color::DarkGray));
                x += 1;
            }
        }
    }
}
