//! Visual keyboard layout rendering

use super::ThemeColors;
use crate::keyboard::layout::{self, KeyDescriptor, TKL_87};
use crate::keyboard::{KeyStats, KeyStatus, KeyboardState, Platform};
use crate::utils::{fit_label, format_cps};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

/// Smallest area the keyboard can be drawn in
pub const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 6;
/// Height that leaves room for a stats line under every key
pub const FULL_HEIGHT: u16 = 12;

/// Visual representation of a keyboard
pub struct KeyboardVisual<'a> {
    state: &'a KeyboardState,
    platform: Platform,
    colors: ThemeColors,
}

impl<'a> KeyboardVisual<'a> {
    pub fn new(state: &'a KeyboardState, platform: Platform, colors: ThemeColors) -> Self {
        Self {
            state,
            platform,
            colors,
        }
    }

    fn render_key(&self, buf: &mut Buffer, x: u16, y: u16, width: u16, key: &KeyDescriptor, with_stats: bool) {
        let id = key.key_id();
        let status = self.state.key_status(&id);
        let (bg, fg) = self.colors.key_colors(status);
        let mut style = Style::default().fg(fg).bg(bg);
        if status == KeyStatus::Pressed {
            style = style.add_modifier(Modifier::BOLD);
        }

        let w = width as usize;
        let label = fit_label(key.label_for(self.platform), w);
        buf.set_string(x, y, format!("{:^w$}", label, w = w), style);

        if with_stats {
            let caption = match (status, self.state.stats(&id)) {
                (KeyStatus::Untested, _) | (_, None) => String::new(),
                (_, Some(stats)) => key_caption(stats, w),
            };
            let caption_style = style.remove_modifier(Modifier::BOLD).add_modifier(Modifier::DIM);
            buf.set_string(x, y + 1, format!("{:<w$}", caption, w = w), caption_style);
        }
    }
}

/// Columns covered by a key that starts `offset` units into its row
fn column_span(offset: f32, width: f32, cell_per_unit: f32) -> (u16, u16) {
    let start = (offset * cell_per_unit).round() as u16;
    let end = ((offset + width) * cell_per_unit).round() as u16;
    // One column of gap after every key
    (start, end.saturating_sub(start).saturating_sub(1).max(1))
}

/// Last hold latency on the left, peak CPS on the right
fn key_caption(stats: &KeyStats, width: usize) -> String {
    let latency = stats
        .last_latency
        .map(|ms| format!("{}", ms.round() as i64))
        .unwrap_or_default();
    let cps = if stats.max_cps > 0.0 {
        format_cps(stats.max_cps)
    } else {
        String::new()
    };

    let with_unit = format!("{}ms", latency);
    let latency = if !latency.is_empty() && with_unit.len() + cps.len() < width {
        with_unit
    } else {
        latency
    };

    let used = latency.chars().count() + cps.chars().count();
    if cps.is_empty() {
        fit_label(&latency, width)
    } else if latency.is_empty() {
        format!("{:>w$}", fit_label(&cps, width), w = width)
    } else if used < width {
        format!("{}{}{}", latency, " ".repeat(width - used), cps)
    } else {
        fit_label(&latency, width)
    }
}

impl<'a> Widget for KeyboardVisual<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            buf.set_string(
                area.x,
                area.y,
                "\u{2328} Window too small",
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        let with_stats = area.height >= FULL_HEIGHT;
        let row_height = if with_stats { 2 } else { 1 };
        let total_units = TKL_87
            .iter()
            .map(|row| layout::row_units(row))
            .fold(0.0, f32::max);
        let cell_per_unit = f32::from(area.width) / total_units;

        for (row_index, row) in TKL_87.iter().enumerate() {
            let y = area.y + row_index as u16 * row_height;
            let mut offset = 0.0;
            for key in row.iter() {
                if !key.is_spacer() {
                    let (col, width) = column_span(offset, key.width, cell_per_unit);
                    if col + width <= area.width {
                        self.render_key(buf, area.x + col, y, width, key, with_stats);
                    }
                }
                offset += key.width;
            }
        }
    }
}
